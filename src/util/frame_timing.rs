use web_time::{Duration, Instant};

/// Frame timing with a smoothed frame duration and per-pass breakdown.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Start of the frame currently being recorded.
    frame_start: Instant,
    /// Frames completed so far.
    frame_count: u64,
    /// Smoothed frame duration in milliseconds (exponential moving average).
    smoothed_ms: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0).
    smoothing: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Create a new frame timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            frame_count: 0,
            smoothed_ms: 0.0,
            smoothing: 0.1,
        }
    }

    /// Mark the start of a frame.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Mark the end of a frame and fold its duration into the average.
    pub fn end_frame(&mut self) -> Duration {
        let elapsed = self.frame_start.elapsed();
        let ms = elapsed.as_secs_f32() * 1000.0;
        self.smoothed_ms = if self.frame_count == 0 {
            ms
        } else {
            self.smoothed_ms * (1.0 - self.smoothing) + ms * self.smoothing
        };
        self.frame_count += 1;
        elapsed
    }

    /// Smoothed frame duration in milliseconds.
    #[must_use]
    pub fn smoothed_ms(&self) -> f32 {
        self.smoothed_ms
    }

    /// Number of frames recorded.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Wall-clock duration of each pass in one frame. Skipped passes stay
/// `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassTimings {
    /// Background compositor.
    pub background: Option<Duration>,
    /// External scene renderer (only recorded by `render_frame`).
    pub scene: Option<Duration>,
    /// Screen-space shadows, including applying the mask to color.
    pub shadows: Option<Duration>,
    /// Depth of field.
    pub depth_of_field: Option<Duration>,
    /// Edge detection.
    pub edges: Option<Duration>,
}

impl PassTimings {
    /// Sum of all recorded pass durations.
    #[must_use]
    pub fn total(&self) -> Duration {
        [
            self.background,
            self.scene,
            self.shadows,
            self.depth_of_field,
            self.edges,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

/// Run `f`, returning its result and how long it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
