use crate::app::metrics::LoopMetricsSnapshot;
use crate::app::rendering::{draw_text, line_advance, text_width, Canvas};
use crate::app::texture::Rgba;

use super::{FrameTimingsSnapshot, TimingSummary};

const TEXT_SCALE: i32 = 2;
const OVERLAY_MARGIN: i32 = 8;
const OVERLAY_PANEL_INSET: i32 = 6;
const OVERLAY_TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];
const PERF_SECTION_LABEL: &str = "Perf";
const SCENE_SECTION_LABEL: &str = "Scene";

#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub timings: FrameTimingsSnapshot,
    pub slow_frame_delay_ms: u64,
    pub scene: &'static str,
    pub entity_count: usize,
    pub scene_lines: Vec<String>,
}

pub(crate) fn draw_overlay(canvas: &mut Canvas<'_>, data: &OverlayData) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let longest = lines
        .iter()
        .map(|line| text_width(line, TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let panel_width = longest + OVERLAY_PANEL_INSET * 2;
    let panel_height = lines.len() as i32 * line_advance(TEXT_SCALE) + OVERLAY_PANEL_INSET * 2;
    let panel_left = canvas.width() as i32 - OVERLAY_MARGIN - panel_width;
    let panel_top = OVERLAY_MARGIN;

    canvas.fill_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        OVERLAY_PANEL_BG_COLOR,
    );
    canvas.stroke_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        1,
        OVERLAY_PANEL_BORDER_COLOR,
    );

    let x = panel_left + OVERLAY_PANEL_INSET;
    let mut y = panel_top + OVERLAY_PANEL_INSET;
    for line in &lines {
        draw_text(canvas, x, y, line, TEXT_SCALE, overlay_line_color(line));
        y += line_advance(TEXT_SCALE);
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        PERF_SECTION_LABEL.to_string(),
        format!(
            "FPS: {:.0}  TPS: {:.0}  dbg+{}ms",
            data.metrics.fps, data.metrics.tps, data.slow_frame_delay_ms
        ),
        format!(
            "Frame: {:.2} ms  clamps: {}",
            data.metrics.frame_time_ms, data.metrics.sim_clamps
        ),
        format_timing_line("SIM", data.timings.sim),
        format_timing_line("REN", data.timings.render),
        String::new(),
        SCENE_SECTION_LABEL.to_string(),
        format!("scene: {}", data.scene),
        format!("entities: {}", data.entity_count),
    ];
    lines.extend(data.scene_lines.iter().cloned());
    lines
}

fn overlay_line_color(line: &str) -> Rgba {
    if matches!(line, PERF_SECTION_LABEL | SCENE_SECTION_LABEL) {
        OVERLAY_TEXT_DIM_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn format_timing_line(label: &str, summary: TimingSummary) -> String {
    format!(
        "{} l/a/m: {:.2}/{:.2}/{:.2} ms",
        label, summary.last_ms, summary.avg_ms, summary.max_ms
    )
}
