/// Circular buffer of mono samples covering a fixed time window.
///
/// Storage is allocated once per capacity. Readers only ever see a
/// chronological copy, never the wrapped layout.
pub struct HistoryRing {
    samples: Vec<f32>,
    write_pos: usize,
    len: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            write_pos: 0,
            len: 0,
        }
    }

    /// Drop all samples and reallocate for a new capacity.
    pub fn resize(&mut self, capacity: usize) {
        if capacity != self.samples.len() {
            self.samples = vec![0.0; capacity];
        } else {
            self.samples.fill(0.0);
        }
        self.write_pos = 0;
        self.len = 0;
    }

    pub fn push(&mut self, sample: f32) {
        let capacity = self.samples.len();
        if capacity == 0 {
            return;
        }
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    pub fn push_slice(&mut self, data: &[f32]) {
        let capacity = self.samples.len();
        if capacity == 0 || data.is_empty() {
            return;
        }

        // Only the tail can survive.
        let data = &data[data.len().saturating_sub(capacity)..];

        let first = data.len().min(capacity - self.write_pos);
        self.samples[self.write_pos..self.write_pos + first].copy_from_slice(&data[..first]);
        let rest = data.len() - first;
        self.samples[..rest].copy_from_slice(&data[first..]);

        self.write_pos = (self.write_pos + data.len()) % capacity;
        self.len = (self.len + data.len()).min(capacity);
    }

    /// Replace `out` with the valid samples, oldest first.
    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        let capacity = self.samples.len();
        if self.len == 0 {
            return;
        }

        let start = (self.write_pos + capacity - self.len) % capacity;
        if start + self.len <= capacity {
            out.extend_from_slice(&self.samples[start..start + self.len]);
        } else {
            out.extend_from_slice(&self.samples[start..]);
            out.extend_from_slice(&self.samples[..self.write_pos]);
        }
    }

}

#[cfg(test)]
impl HistoryRing {
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of valid samples, at most `capacity`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len);
        self.copy_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryRing;

    #[test]
    fn partially_filled_ring_returns_only_written_samples() {
        let mut ring = HistoryRing::new(8);
        ring.push_slice(&[1.0, 2.0, 3.0]);

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn overflow_keeps_most_recent_samples_in_order() {
        let mut ring = HistoryRing::new(5);
        ring.push_slice(&[1.0, 2.0, 3.0]);
        ring.push_slice(&[4.0, 5.0, 6.0]);
        ring.push(7.0);

        assert_eq!(ring.len(), 5);
        assert_eq!(ring.to_vec(), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn slice_longer_than_capacity_keeps_its_tail() {
        let mut ring = HistoryRing::new(4);
        ring.push(-1.0);
        let data: Vec<f32> = (0..10).map(|i| i as f32).collect();
        ring.push_slice(&data);

        assert_eq!(ring.to_vec(), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn many_wraps_match_a_naive_window() {
        let mut ring = HistoryRing::new(7);
        let mut expected = Vec::new();

        for chunk in 0..20 {
            let data: Vec<f32> = (0..(chunk % 4 + 1)).map(|i| (chunk * 10 + i) as f32).collect();
            ring.push_slice(&data);
            expected.extend_from_slice(&data);
        }

        let tail = expected[expected.len() - 7..].to_vec();
        assert_eq!(ring.to_vec(), tail);
    }

    #[test]
    fn resize_clears_and_changes_capacity() {
        let mut ring = HistoryRing::new(4);
        ring.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        ring.resize(6);

        assert_eq!(ring.capacity(), 6);
        assert!(ring.is_empty());
        assert!(ring.to_vec().is_empty());

        ring.push_slice(&[9.0]);
        assert_eq!(ring.to_vec(), vec![9.0]);
    }

    #[test]
    fn zero_capacity_ring_ignores_samples() {
        let mut ring = HistoryRing::new(0);
        ring.push_slice(&[1.0, 2.0]);
        ring.push(3.0);

        assert!(ring.is_empty());
    }
}
