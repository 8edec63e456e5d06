use std::collections::VecDeque;
use std::time::Duration;

pub(crate) const TIMING_WINDOW_LEN: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TimingSummary {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameTimingsSnapshot {
    pub sim: TimingSummary,
    pub render: TimingSummary,
}

#[derive(Debug, Default)]
pub(crate) struct FrameTimings {
    sim: RollingWindow,
    render: RollingWindow,
}

impl FrameTimings {
    pub(crate) fn record_frame(&mut self, sim: Duration, render: Duration) {
        self.sim.push(duration_ms(sim));
        self.render.push(duration_ms(render));
    }

    pub(crate) fn snapshot(&self) -> FrameTimingsSnapshot {
        FrameTimingsSnapshot {
            sim: self.sim.summary(),
            render: self.render.summary(),
        }
    }
}

#[derive(Debug, Default)]
struct RollingWindow {
    samples: VecDeque<f32>,
    sum_ms: f32,
}

impl RollingWindow {
    fn push(&mut self, value_ms: f32) {
        if self.samples.len() == TIMING_WINDOW_LEN {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum_ms -= evicted;
            }
        }
        self.samples.push_back(value_ms);
        self.sum_ms += value_ms;
    }

    fn summary(&self) -> TimingSummary {
        let Some(&last_ms) = self.samples.back() else {
            return TimingSummary::default();
        };
        TimingSummary {
            last_ms,
            avg_ms: self.sum_ms / self.samples.len() as f32,
            max_ms: self.samples.iter().copied().fold(f32::MIN, f32::max),
        }
    }
}

fn duration_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_summarizes_to_zero() {
        let timings = FrameTimings::default();
        assert_eq!(timings.snapshot(), FrameTimingsSnapshot::default());
    }

    #[test]
    fn partial_window_averages_recorded_samples_only() {
        let mut window = RollingWindow::default();
        window.push(1.0);
        window.push(2.0);
        window.push(3.0);
        let summary = window.summary();

        assert_eq!(summary.last_ms, 3.0);
        assert!((summary.avg_ms - 2.0).abs() < 0.0001);
        assert_eq!(summary.max_ms, 3.0);
    }

    #[test]
    fn evicted_peak_no_longer_counts_as_max() {
        let mut window = RollingWindow::default();
        window.push(100.0);
        for _ in 1..TIMING_WINDOW_LEN {
            window.push(10.0);
        }
        window.push(20.0);
        let summary = window.summary();

        let expected_avg = ((TIMING_WINDOW_LEN as f32 - 2.0) * 10.0 + 20.0 + 10.0)
            / TIMING_WINDOW_LEN as f32;
        assert_eq!(summary.last_ms, 20.0);
        assert_eq!(summary.max_ms, 20.0);
        assert!((summary.avg_ms - expected_avg).abs() < 0.01);
    }

    #[test]
    fn frame_record_splits_sim_and_render() {
        let mut timings = FrameTimings::default();
        timings.record_frame(Duration::from_micros(1_500), Duration::from_millis(4));
        let snapshot = timings.snapshot();

        assert!((snapshot.sim.last_ms - 1.5).abs() < 0.0001);
        assert!((snapshot.render.last_ms - 4.0).abs() < 0.0001);
    }
}
