use std::collections::VecDeque;
use std::time::Duration;

/// Sliding window of recent frame times plus a running count of stalls.
///
/// A stall is any frame longer than the threshold; those are the frames the
/// simulation clamps to its maximum step.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    samples: VecDeque<Duration>,
    window: usize,
    stall_threshold: Option<Duration>,
    stalls: u64,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "frame timer window must be positive");
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            stall_threshold: None,
            stalls: 0,
        }
    }

    pub fn with_stall_threshold(mut self, threshold: Duration) -> Self {
        self.stall_threshold = Some(threshold);
        self
    }

    /// Add one frame. Returns whether it counted as a stall.
    pub fn record(&mut self, elapsed: Duration) -> bool {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);

        let stalled = self.stall_threshold.is_some_and(|limit| elapsed > limit);
        if stalled {
            self.stalls += 1;
        }
        stalled
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> Duration {
        match self.samples.len() {
            0 => Duration::ZERO,
            n => self.samples.iter().sum::<Duration>() / n as u32,
        }
    }

    /// Longest frame still in the window.
    pub fn worst(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }

    pub fn best(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or_default()
    }

    /// Stalls seen since construction, including ones that left the window.
    pub fn stalls(&self) -> u64 {
        self.stalls
    }

    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { avg.recip() } else { 0.0 }
    }
}
