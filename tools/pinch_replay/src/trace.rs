use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use pinchsense::{TouchState, Vec3};

const SAMPLE_HEADER: &str = "pinch_trace,t,ix,iy,iz,tx,ty,tz,confidence";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceRecord {
    Sample {
        t: f64,
        index_tip: Vec3,
        thumb_tip: Vec3,
        confidence: f32,
    },
    /// Hand tracking lost at `t`.
    Reset { t: f64 },
}

impl TraceRecord {
    pub fn time(&self) -> f64 {
        match self {
            Self::Sample { t, .. } | Self::Reset { t } => *t,
        }
    }
}

pub fn parse_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out: Vec<TraceRecord> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line =
            line_result.with_context(|| format!("failed to read {}:{}", path.display(), line_no))?;
        let Some(record) = parse_trace_line(&line)
            .with_context(|| format!("{}:{} invalid trace line", path.display(), line_no))?
        else {
            continue;
        };

        if let Some(previous) = out.last() {
            if record.time() < previous.time() {
                bail!(
                    "{}:{} timestamp {} goes backwards (previous {})",
                    path.display(),
                    line_no,
                    record.time(),
                    previous.time()
                );
            }
        }
        out.push(record);
    }

    Ok(out)
}

/// Parses one trace line. Blank lines, comments, the header and lines of
/// unknown kind yield `None`.
pub fn parse_trace_line(line: &str) -> Result<Option<TraceRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == SAMPLE_HEADER {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    match parts[0] {
        "pinch_trace" => {
            if parts.len() != 9 {
                bail!("expected 9 columns, got {}", parts.len());
            }
            Ok(Some(TraceRecord::Sample {
                t: parse_f64(parts[1], "t")?,
                index_tip: [
                    parse_f32(parts[2], "ix")?,
                    parse_f32(parts[3], "iy")?,
                    parse_f32(parts[4], "iz")?,
                ],
                thumb_tip: [
                    parse_f32(parts[5], "tx")?,
                    parse_f32(parts[6], "ty")?,
                    parse_f32(parts[7], "tz")?,
                ],
                confidence: parse_f32(parts[8], "confidence")?,
            }))
        }
        "reset" => {
            if parts.len() != 2 {
                bail!("expected 2 columns, got {}", parts.len());
            }
            Ok(Some(TraceRecord::Reset {
                t: parse_f64(parts[1], "t")?,
            }))
        }
        _ => Ok(None),
    }
}

pub fn parse_expected_states(path: &Path) -> Result<Vec<TouchState>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut states = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line =
            line_result.with_context(|| format!("failed to read {}:{}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let state = TouchState::from_label(token).ok_or_else(|| {
            anyhow!(
                "{}:{} invalid expected state: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        states.push(state);
    }

    Ok(states)
}

fn parse_f64(raw: &str, field: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("invalid {field} '{raw}'"))?;
    if !value.is_finite() {
        bail!("{field} must be finite, got '{raw}'");
    }
    Ok(value)
}

fn parse_f32(raw: &str, field: &str) -> Result<f32> {
    let value: f32 = raw
        .parse()
        .with_context(|| format!("invalid {field} '{raw}'"))?;
    if !value.is_finite() {
        bail!("{field} must be finite, got '{raw}'");
    }
    Ok(value)
}
