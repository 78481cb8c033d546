use std::time::{Duration, Instant};

/// Measures frame times and optionally holds frames to a target rate
pub struct Framepacer {
    frame_start: Instant,
    last_frametime: Duration,
    /// Exponentially smoothed frame time in seconds, for display
    smoothed: f32,
}

impl Framepacer {
    const SMOOTHING: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            last_frametime: Duration::ZERO,
            smoothed: 0.0,
        }
    }

    /// Seconds spent in the frame that last ended
    pub fn frametime(&self) -> f32 {
        self.last_frametime.as_secs_f32()
    }

    pub fn framerate(&self) -> f32 {
        if self.smoothed > f32::EPSILON {
            1.0 / self.smoothed
        } else {
            0.0
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Finish the frame, sleeping until `target` has passed when there is one
    pub fn end_frame(&mut self, target: Option<Duration>) {
        if let Some(target) = target {
            const ACCURACY: Duration = Duration::from_micros(100);
            if let Some(sleep) = target.checked_sub(self.frame_start.elapsed() + ACCURACY) {
                std::thread::sleep(sleep);
            }
            while self.frame_start.elapsed() < target {
                std::thread::yield_now();
            }
        }

        self.last_frametime = self.frame_start.elapsed();
        let seconds = self.last_frametime.as_secs_f32();
        self.smoothed = if self.smoothed == 0.0 {
            seconds
        } else {
            self.smoothed + (seconds - self.smoothed) * Self::SMOOTHING
        };
    }
}

/// Frame duration for a framerate, `None` meaning unlimited
pub fn frame_budget(framerate: Option<u32>) -> Option<Duration> {
    framerate
        .filter(|fps| *fps > 0)
        .map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_for_framerates() {
        assert_eq!(frame_budget(None), None);
        assert_eq!(frame_budget(Some(0)), None);
        assert_eq!(frame_budget(Some(50)), Some(Duration::from_millis(20)));
    }

    #[test]
    fn limited_frames_take_at_least_the_budget() {
        let mut pacer = Framepacer::new();
        pacer.begin_frame();
        pacer.end_frame(Some(Duration::from_millis(5)));

        assert!(pacer.frametime() >= 0.005);
        assert!(pacer.framerate() > 0.0);
    }
}
