use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LockResult, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub sim_clamps: u32,
}

/// Latest published loop metrics, shared between the loop and its observers.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
    poison_reported: Arc<AtomicBool>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *self.recover(self.latest.read(), "read")
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *self.recover(self.latest.write(), "write") = snapshot;
    }

    // Snapshots are written whole, so a poisoned lock still holds a valid one.
    fn recover<G>(&self, result: LockResult<G>, operation: &'static str) -> G {
        result.unwrap_or_else(|poisoned| {
            if !self.poison_reported.swap(true, Ordering::Relaxed) {
                warn!(operation, "metrics_lock_poisoned");
            }
            poisoned.into_inner()
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct IntervalCounts {
    frames: u32,
    ticks: u32,
    sim_clamps: u32,
    frame_time: Duration,
}

impl IntervalCounts {
    fn into_snapshot(self, elapsed: Duration) -> LoopMetricsSnapshot {
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            sim_clamps: self.sim_clamps,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    window_start: Instant,
    window: Duration,
    counts: IntervalCounts,
}

impl MetricsAccumulator {
    pub(crate) fn new(window: Duration) -> Self {
        Self::from_instant(Instant::now(), window)
    }

    fn from_instant(window_start: Instant, window: Duration) -> Self {
        Self {
            window_start,
            window,
            counts: IntervalCounts::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.counts.frames = self.counts.frames.saturating_add(1);
        self.counts.frame_time = self.counts.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.counts.ticks = self.counts.ticks.saturating_add(1);
    }

    pub(crate) fn record_sim_clamp(&mut self) {
        self.counts.sim_clamps = self.counts.sim_clamps.saturating_add(1);
    }

    /// Closes the window once it has elapsed and starts a new one at `now`.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        self.window_start = now;
        Some(mem::take(&mut self.counts).into_snapshot(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn poison(handle: &MetricsHandle) {
        let lock = handle.latest.as_ref();
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn window_snapshot_reports_rates() {
        let start = Instant::now();
        let mut accumulator = MetricsAccumulator::from_instant(start, Duration::from_secs(2));

        for _ in 0..4 {
            accumulator.record_frame(Duration::from_millis(20));
        }
        for _ in 0..8 {
            accumulator.record_tick();
        }
        accumulator.record_sim_clamp();

        let snapshot = accumulator
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("window elapsed");

        assert!((snapshot.fps - 2.0).abs() < 0.001);
        assert!((snapshot.tps - 4.0).abs() < 0.001);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.001);
        assert_eq!(snapshot.sim_clamps, 1);
    }

    #[test]
    fn open_window_yields_nothing_and_closed_window_starts_empty() {
        let start = Instant::now();
        let mut accumulator = MetricsAccumulator::from_instant(start, Duration::from_secs(1));
        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_sim_clamp();
        assert_eq!(accumulator.maybe_snapshot(start + Duration::from_millis(500)), None);

        let first = accumulator.maybe_snapshot(start + Duration::from_secs(1));
        let second = accumulator.maybe_snapshot(start + Duration::from_secs(2));

        assert_eq!(first.map(|s| s.sim_clamps), Some(1));
        assert_eq!(second, Some(LoopMetricsSnapshot::default()));
    }

    #[test]
    fn empty_window_has_zero_frame_time() {
        let snapshot = IntervalCounts {
            ticks: 60,
            ..IntervalCounts::default()
        }
        .into_snapshot(Duration::from_secs(1));

        assert_eq!(snapshot.frame_time_ms, 0.0);
        assert_eq!(snapshot.fps, 0.0);
        assert!((snapshot.tps - 60.0).abs() < 0.001);
    }

    #[test]
    fn poisoned_handle_still_reads_and_publishes() {
        let handle = MetricsHandle::default();
        poison(&handle);
        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());

        let expected = LoopMetricsSnapshot {
            fps: 15.0,
            tps: 60.0,
            frame_time_ms: 11.0,
            sim_clamps: 2,
        };
        handle.clone().publish(expected);
        assert_eq!(handle.snapshot(), expected);
        assert!(handle.poison_reported.load(Ordering::Relaxed));
    }
}
