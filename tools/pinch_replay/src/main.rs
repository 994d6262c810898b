mod logging;
mod trace;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use pinchsense::{
    load_settings, ManualClock, TouchDetectionSettings, TouchEvent, TouchState,
    TouchStateDetector,
};

use logging::ReplayLogger;
use trace::{parse_expected_states, parse_trace, TraceRecord};

#[derive(Debug, Parser)]
#[command(name = "pinch_replay")]
#[command(about = "Replay a recorded pinch trace through the touch detector")]
struct Cli {
    /// Trace CSV (`pinch_trace,t,ix,iy,iz,tx,ty,tz,confidence` and `reset,t` lines)
    trace: PathBuf,
    /// Settings TOML; built-in defaults when omitted
    #[arg(long)]
    settings: Option<PathBuf>,
    /// File listing the expected sequence of entered states, one per line
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Log every state transition
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default)]
struct ReplayOutcome {
    lines: Vec<String>,
    entered: Vec<TouchState>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    ReplayLogger::from_env(level)?.install()?;

    let settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => TouchDetectionSettings::default(),
    };

    let records = parse_trace(&cli.trace)?;
    info!("replaying {} records from {}", records.len(), cli.trace.display());
    let outcome = replay(&records, settings);

    println!("event,t,state,strength,duration,confidence");
    for line in &outcome.lines {
        println!("{line}");
    }

    if let Some(expect_path) = cli.expect {
        let expected = parse_expected_states(&expect_path)?;
        check_expected(&outcome.entered, &expected)?;
    }

    Ok(())
}

fn replay(records: &[TraceRecord], settings: TouchDetectionSettings) -> ReplayOutcome {
    let clock = ManualClock::new(0.0);
    let mut detector = TouchStateDetector::with_clock(settings, clock.clone());
    let mut outcome = ReplayOutcome::default();

    for record in records {
        clock.set(record.time());
        match *record {
            TraceRecord::Sample {
                index_tip,
                thumb_tip,
                confidence,
                ..
            } => {
                let event = detector.update(index_tip, thumb_tip, confidence);
                outcome.lines.push(event_line(&event));
                if let Some((from, to)) = detector.last_transition() {
                    outcome
                        .lines
                        .push(format!("transition,{:.4},{},{}", event.timestamp, from, to));
                    outcome.entered.push(to);
                }
            }
            TraceRecord::Reset { t } => {
                let before = detector.current_state();
                detector.reset_state();
                outcome.lines.push(format!("reset,{t:.4},{before}"));
            }
        }
    }

    outcome
}

fn event_line(event: &TouchEvent) -> String {
    format!(
        "event,{:.4},{},{:.3},{:.4},{:.3}",
        event.timestamp, event.state, event.strength, event.duration, event.confidence
    )
}

fn check_expected(actual: &[TouchState], expected: &[TouchState]) -> Result<()> {
    if actual == expected {
        return Ok(());
    }
    eprintln!("expected states: {}", join_states(expected));
    eprintln!("actual states:   {}", join_states(actual));
    bail!("state sequence mismatch")
}

fn join_states(states: &[TouchState]) -> String {
    states
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
