//! Host timestamp to simulation delta conversion

use crate::consts::{FRAME_MS, MAX_FRAME_DELTA_MS};

const FPS_WINDOW: usize = 60;

/// Turns animation-frame timestamps into capped game-time deltas.
///
/// Time spent suspended is never charged to the simulation: the first
/// frame after [`FrameClock::suspend`] yields a nominal single frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_time: Option<f64>,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_time: None,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Delta in ms for the frame stamped `time_ms`, capped at 250 ms
    pub fn advance(&mut self, time_ms: f64) -> f32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) as f32).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => FRAME_MS,
        };
        self.last_time = Some(time_ms);

        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && time_ms > oldest {
            self.fps = ((FPS_WINDOW as f64 - 1.0) * 1000.0 / (time_ms - oldest)).round() as u32;
        }
        dt
    }

    /// Forget the last timestamp (pause, hidden tab, card menu)
    pub fn suspend(&mut self) {
        self.last_time = None;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_nominal() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(12_345.0), FRAME_MS);
        assert!((clock.advance(12_361.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_delta_is_capped() {
        let mut clock = FrameClock::new();
        clock.advance(1_000.0);
        assert_eq!(clock.advance(9_000.0), MAX_FRAME_DELTA_MS);
    }

    #[test]
    fn test_suspended_time_not_charged() {
        let mut clock = FrameClock::new();
        clock.advance(1_000.0);
        clock.suspend();
        assert_eq!(clock.advance(1_200.0), FRAME_MS);
    }

    #[test]
    fn test_backwards_timestamp_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(1_000.0);
        assert_eq!(clock.advance(900.0), 0.0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::new();
        for i in 1..=120 {
            clock.advance(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(clock.fps(), 60);
    }
}
