use crate::geo::wrap_360;

/// Circular moving average for compass headings
///
/// Averages the last N headings as unit vectors so the window behaves across
/// the 359°/0° wrap. Used by the sampler to steady a jittery compass before
/// the heading reaches the device state.
///
/// The filter keeps a circular buffer of sine/cosine pairs and updates
/// incrementally.
pub struct HeadingSmoother {
    buffer: Vec<(f64, f64)>,
    index: usize,
    filled: bool,
}

impl HeadingSmoother {
    /// Create a new heading smoother
    ///
    /// # Arguments
    /// * `window_size` - Number of headings to average (1 passes values through)
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: vec![(0.0, 0.0); window_size.max(1)],
            index: 0,
            filled: false,
        }
    }

    /// Add a heading in degrees and return the smoothed heading in [0, 360)
    pub fn add(&mut self, heading_degrees: f64) -> f64 {
        let rad = heading_degrees.to_radians();
        self.buffer[self.index] = (rad.sin(), rad.cos());
        self.index = (self.index + 1) % self.buffer.len();

        if self.index == 0 {
            self.filled = true;
        }

        self.average().unwrap_or(wrap_360(heading_degrees))
    }

    /// Current mean heading, or `None` when the window is empty or the
    /// headings cancel out
    pub fn average(&self) -> Option<f64> {
        let count = if self.filled {
            self.buffer.len()
        } else {
            self.index
        };
        if count == 0 {
            return None;
        }
        let (s, c) = self.buffer[..count]
            .iter()
            .fold((0.0, 0.0), |(s, c), &(bs, bc)| (s + bs, c + bc));
        if s.hypot(c) < 1e-9 {
            return None;
        }
        Some(wrap_360(s.atan2(c).to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_of_one_passes_through() {
        let mut s = HeadingSmoother::new(1);
        assert!((s.add(10.0) - 10.0).abs() < 1e-9);
        assert!((s.add(200.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_across_north() {
        let mut s = HeadingSmoother::new(2);
        s.add(350.0);
        let avg = s.add(10.0);
        assert!(avg < 1e-6 || avg > 360.0 - 1e-6, "got {}", avg);
    }

    #[test]
    fn test_window_slides() {
        let mut s = HeadingSmoother::new(3);
        s.add(0.0);
        s.add(0.0);
        s.add(90.0);
        s.add(90.0);
        let avg = s.add(90.0);
        assert!((avg - 90.0).abs() < 1e-6);
    }
}
