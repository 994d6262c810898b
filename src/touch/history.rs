/// Fixed-capacity ring buffer that overwrites its oldest entry once full.
///
/// Index `0` is the oldest retained sample, `len() - 1` the newest.
#[derive(Clone, Debug)]
pub struct CircularHistory<T, const N: usize> {
    slots: [T; N],
    head: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> Default for CircularHistory<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> CircularHistory<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        let tail = (self.head + self.len) % N;
        self.slots[tail] = value;
        if self.len < N {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % N;
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        Some(self.slots[(self.head + index) % N])
    }

    pub fn newest(&self) -> Option<T> {
        self.len.checked_sub(1).and_then(|idx| self.get(idx))
    }

    /// Forgets every sample. Backing storage is left as is.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |idx| self.slots[(self.head + idx) % N])
    }
}

impl<const N: usize> CircularHistory<f32, N> {
    /// Arithmetic mean of the retained samples, 0 when empty.
    pub fn mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        self.iter().sum::<f32>() / self.len as f32
    }
}
