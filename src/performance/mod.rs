//! # Frame Timing
//!
//! Rolling frame-time statistics for the FPS overlay.
//!
//! ```no_run
//! use showroom::performance::PerformanceMonitor;
//!
//! let mut monitor = PerformanceMonitor::new();
//! monitor.begin_frame();
//! // ... render frame ...
//! monitor.end_frame();
//! println!("{:.0} fps", monitor.get_metrics().fps);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub fps: f32,
    /// Average over the sample window, in milliseconds
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    pub draw_calls: u32,
    pub triangle_count: u32,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: f32::MAX,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            triangle_count: 0,
        }
    }
}

pub struct PerformanceMonitor {
    /// Ring buffer of recent frame times
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    /// Start of the frame being timed
    frame_start: Option<Instant>,
    current_metrics: PerformanceMetrics,
    last_update: Instant,
    update_interval: Duration,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_samples(120) // ~2 seconds at 60fps
    }

    pub fn with_samples(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            frame_start: None,
            current_metrics: PerformanceMetrics::default(),
            last_update: Instant::now(),
            update_interval: Duration::from_millis(250),
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.record_frame(start.elapsed());
        }
    }

    /// Adds one frame-time sample, refreshing the metrics at most a few times per second
    ///
    /// # Arguments
    /// * `frame_time` - Wall-clock duration of the frame
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        if self.last_update.elapsed() >= self.update_interval {
            self.update_metrics();
            self.last_update = Instant::now();
        }
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total_time: Duration = self.frame_times.iter().sum();
        let avg_frame_time_ms = total_time.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.current_metrics.frame_time_ms = avg_frame_time_ms;
        self.current_metrics.fps = if avg_frame_time_ms > 0.0 {
            1000.0 / avg_frame_time_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) =
            (self.frame_times.iter().min(), self.frame_times.iter().max())
        {
            self.current_metrics.min_frame_time_ms = min_time.as_secs_f32() * 1000.0;
            self.current_metrics.max_frame_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    /// Records what the last frame drew
    ///
    /// # Arguments
    /// * `draw_calls` - Indexed draws issued for scene meshes
    /// * `triangle_count` - Triangles across those draws
    pub fn update_render_stats(&mut self, draw_calls: u32, triangle_count: u32) {
        self.current_metrics.draw_calls = draw_calls;
        self.current_metrics.triangle_count = triangle_count;
    }

    pub fn get_metrics(&self) -> &PerformanceMetrics {
        &self.current_metrics
    }

    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.current_metrics = PerformanceMetrics::default();
        self.frame_start = None;
        self.last_update = Instant::now();
    }

    /// Compact FPS readout in the top-right corner
    pub fn render_overlay(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        let metrics = &self.current_metrics;

        ui.window("FPS")
            .size([150.0, 70.0], imgui::Condition::Always)
            .position([display_size[0] - 160.0, 10.0], imgui::Condition::Always)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.3)
            .build(|| {
                ui.text(format!("FPS: {:.0}", metrics.fps));
                ui.text(format!("{:.1}ms", metrics.frame_time_ms));
                ui.text(format!("{} tris", metrics.triangle_count));
            });
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_steady_frames() {
        let mut monitor = PerformanceMonitor::with_samples(10);
        monitor.update_interval = Duration::ZERO;

        for _ in 0..20 {
            monitor.record_frame(Duration::from_millis(20));
        }

        let metrics = monitor.get_metrics();
        assert!((metrics.frame_time_ms - 20.0).abs() < 1e-3);
        assert!((metrics.fps - 50.0).abs() < 1e-2);
        assert_eq!(monitor.frame_times.len(), 10);
    }

    #[test]
    fn test_min_max_track_window() {
        let mut monitor = PerformanceMonitor::with_samples(4);
        monitor.update_interval = Duration::ZERO;

        for ms in [10, 30, 20, 40] {
            monitor.record_frame(Duration::from_millis(ms));
        }
        assert!((monitor.get_metrics().min_frame_time_ms - 10.0).abs() < 1e-3);
        assert!((monitor.get_metrics().max_frame_time_ms - 40.0).abs() < 1e-3);

        // 10ms sample falls out of the window
        monitor.record_frame(Duration::from_millis(25));
        assert!((monitor.get_metrics().min_frame_time_ms - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut monitor = PerformanceMonitor::new();
        monitor.update_interval = Duration::ZERO;
        monitor.record_frame(Duration::from_millis(16));
        monitor.update_render_stats(3, 1200);
        monitor.reset();
        assert_eq!(monitor.get_metrics(), &PerformanceMetrics::default());
    }
}
