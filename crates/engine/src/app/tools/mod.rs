mod frame_timings;
mod overlay;

pub(crate) use frame_timings::{FrameTimings, FrameTimingsSnapshot, TimingSummary};
pub(crate) use overlay::{draw_overlay, OverlayData};
