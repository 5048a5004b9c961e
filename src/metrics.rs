//! Per-frame performance counters for the batching engine.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const FRAME_WINDOW: usize = 120;

/// Tracks draw calls, uploads, and frame pacing over a sliding window.
pub struct RenderMetrics {
    frame_times: VecDeque<Duration>,
    frame_start: Instant,
    /// Instanced draw calls issued this frame (base + composite passes).
    pub draw_calls: u32,
    /// Instance buffer uploads this frame (one per non-empty batch).
    pub buffer_uploads: u32,
    /// Sprite instances drained from batchers this frame.
    pub instances: usize,
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
            frame_start: Instant::now(),
            draw_calls: 0,
            buffer_uploads: 0,
            instances: 0,
        }
    }

    /// Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
        self.draw_calls = 0;
        self.buffer_uploads = 0;
        self.instances = 0;
    }

    /// Call at presentation time.
    pub fn end_frame(&mut self) {
        self.frame_times.push_back(self.frame_start.elapsed());
        if self.frame_times.len() > FRAME_WINDOW {
            self.frame_times.pop_front();
        }
    }

    pub fn record_draw_call(&mut self) {
        self.draw_calls += 1;
    }

    pub fn record_buffer_upload(&mut self) {
        self.buffer_uploads += 1;
    }

    pub fn record_instances(&mut self, count: usize) {
        self.instances += count;
    }

    /// Average frame time in milliseconds over the window.
    pub fn avg_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let sum: Duration = self.frame_times.iter().sum();
        sum.as_secs_f32() * 1000.0 / self.frame_times.len() as f32
    }

    /// Frames per second derived from the average frame time.
    pub fn fps(&self) -> f32 {
        let ms = self.avg_frame_time_ms();
        if ms > 0.0 {
            1000.0 / ms
        } else {
            0.0
        }
    }

    /// Most recent frame time in milliseconds.
    pub fn last_frame_time_ms(&self) -> f32 {
        self.frame_times
            .back()
            .map(|d| d.as_secs_f32() * 1000.0)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn counters_reset_each_frame() {
        let mut metrics = RenderMetrics::new();

        metrics.begin_frame();
        metrics.record_draw_call();
        metrics.record_draw_call();
        metrics.record_buffer_upload();
        metrics.record_instances(500);
        thread::sleep(Duration::from_millis(1));
        metrics.end_frame();

        assert_eq!(metrics.draw_calls, 2);
        assert_eq!(metrics.buffer_uploads, 1);
        assert_eq!(metrics.instances, 500);
        assert!(metrics.last_frame_time_ms() >= 1.0);

        metrics.begin_frame();
        assert_eq!(metrics.draw_calls, 0);
        assert_eq!(metrics.instances, 0);
    }

    #[test]
    fn fps_tracks_frame_time() {
        let mut metrics = RenderMetrics::new();

        for _ in 0..10 {
            metrics.begin_frame();
            thread::sleep(Duration::from_millis(16));
            metrics.end_frame();
        }

        let fps = metrics.fps();
        // Roughly 60fps, wide tolerance for sleep precision
        assert!(fps > 30.0 && fps < 100.0, "FPS was {}", fps);
    }
}
