mod canvas;
mod renderer;
mod text;

pub(crate) use canvas::Canvas;
pub use renderer::Renderer;
pub(crate) use text::{draw_text, line_advance, text_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn center_x(self) -> f32 {
        self.width as f32 * 0.5
    }
}
