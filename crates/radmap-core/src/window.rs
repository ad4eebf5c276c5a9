use std::collections::VecDeque;

/// Default number of points in the real-time strip chart.
pub const WINDOW_CAPACITY: usize = 30;

/// Fixed-capacity FIFO buffer of recent dose-rate values.
///
/// The window is always exactly `capacity` long: it starts pre-filled with
/// zeros and `append` evicts the oldest value, so chart consumers can
/// assume full-width rendering from the very first sample.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            values: VecDeque::from(vec![0.0; capacity]),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Refill with zeros, discarding all recorded values.
    pub fn reset(&mut self) {
        self.values.clear();
        self.values.resize(self.capacity, 0.0);
    }

    /// Append a value at the newest end, evicting the oldest.
    pub fn append(&mut self, value: f64) {
        self.values.pop_front();
        self.values.push_back(value);
    }

    /// Current contents, oldest to newest. Length always equals capacity.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Largest value in the window, floored at 0.1 so height normalization
    /// never divides by zero on an all-zero window.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.1, f64::max)
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}
