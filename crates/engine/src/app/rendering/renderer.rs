use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::app::tools::{draw_overlay, OverlayData};
use crate::app::world::{RenderableKind, SceneWorld, TextAnchor};
use crate::app::Vec2;

use super::canvas::Canvas;
use super::text::{draw_text, text_height, text_width};
use super::Viewport;

const MISSING_TEXTURE_COLOR: [u8; 4] = [255, 0, 255, 255];
const RECT_STROKE_THICKNESS: i32 = 2;

pub struct Renderer {
    pixels: Pixels<'static>,
    viewport: Viewport,
    warned_missing_textures: HashSet<&'static str>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        Ok(Self {
            pixels,
            viewport,
            warned_missing_textures: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub(crate) fn render_world(
        &mut self,
        world: &SceneWorld,
        overlay: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let mut canvas = Canvas::new(
            self.pixels.frame_mut(),
            self.viewport.width,
            self.viewport.height,
        );
        let missing = draw_world(&mut canvas, world);
        if let Some(data) = overlay {
            draw_overlay(&mut canvas, data);
        }
        for texture in missing {
            if self.warned_missing_textures.insert(texture) {
                warn!(texture, "texture_missing");
            }
        }
        self.pixels.render()
    }
}

pub(crate) fn draw_world(canvas: &mut Canvas<'_>, world: &SceneWorld) -> Vec<&'static str> {
    let mut missing = Vec::new();
    canvas.clear(world.background());

    for entity in world.entities() {
        let position = entity.position;
        match &entity.renderable.kind {
            RenderableKind::Sprite {
                texture,
                scale,
                flip_x,
            } => match world.textures().get(texture) {
                Some(image) => {
                    let size = Vec2::new(
                        image.width() as f32 * scale.x,
                        image.height() as f32 * scale.y,
                    );
                    let (x, y) = top_left_of(position, size);
                    canvas.blit_scaled(
                        image,
                        x,
                        y,
                        size.x.round() as i32,
                        size.y.round() as i32,
                        *flip_x,
                    );
                }
                None => {
                    missing.push(*texture);
                    let (x, y) = top_left_of(position, Vec2::new(8.0, 8.0));
                    canvas.fill_rect(x, y, 8, 8, MISSING_TEXTURE_COLOR);
                }
            },
            RenderableKind::TileSprite {
                texture,
                size,
                tile_scale,
            } => match world.textures().get(texture) {
                Some(image) => {
                    let (x, y) = top_left_of(position, *size);
                    canvas.blit_tiled(
                        image,
                        x,
                        y,
                        size.x.round() as i32,
                        size.y.round() as i32,
                        (image.width() as f32 * tile_scale.x).round() as i32,
                        (image.height() as f32 * tile_scale.y).round() as i32,
                    );
                }
                None => missing.push(*texture),
            },
            RenderableKind::Rect { size, fill, stroke } => {
                let (x, y) = top_left_of(position, *size);
                let (w, h) = (size.x.round() as i32, size.y.round() as i32);
                canvas.fill_rect(x, y, w, h, *fill);
                if let Some(stroke) = stroke {
                    canvas.stroke_rect(x, y, w, h, RECT_STROKE_THICKNESS, *stroke);
                }
            }
            RenderableKind::Text {
                text,
                scale,
                color,
                anchor,
            } => {
                let (x, y) = match anchor {
                    TextAnchor::TopLeft => (position.x.round() as i32, position.y.round() as i32),
                    TextAnchor::Center => (
                        (position.x - text_width(text, *scale) as f32 * 0.5).round() as i32,
                        (position.y - text_height(*scale) as f32 * 0.5).round() as i32,
                    ),
                };
                draw_text(canvas, x, y, text, *scale, *color);
            }
        }
    }

    missing
}

fn top_left_of(center: Vec2, size: Vec2) -> (i32, i32) {
    (
        (center.x - size.x * 0.5).round() as i32,
        (center.y - size.y * 0.5).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::texture::Texture;
    use crate::app::world::RenderableDesc;
    use crate::PhysicsConfig;

    const BG: [u8; 4] = [17, 18, 24, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn world(width: u32, height: u32) -> SceneWorld {
        let mut world = SceneWorld::new(Viewport { width, height }, PhysicsConfig::default());
        world.set_background(BG);
        world
    }

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn empty_world_clears_to_background() {
        let world = world(4, 4);
        let mut frame = vec![0u8; 4 * 4 * 4];
        let missing = draw_world(&mut Canvas::new(&mut frame, 4, 4), &world);

        assert!(missing.is_empty());
        assert!(frame.chunks_exact(4).all(|chunk| chunk == BG));
    }

    #[test]
    fn sprite_is_centered_on_entity_position() {
        let mut world = world(10, 10);
        world.textures_mut().insert("dot", Texture::filled(2, 2, RED));
        world.spawn(Vec2::new(5.0, 5.0), RenderableDesc::sprite("dot"));
        world.apply_pending();

        let mut frame = vec![0u8; 10 * 10 * 4];
        draw_world(&mut Canvas::new(&mut frame, 10, 10), &world);

        assert_eq!(pixel(&frame, 10, 4, 4), RED);
        assert_eq!(pixel(&frame, 10, 5, 5), RED);
        assert_eq!(pixel(&frame, 10, 6, 6), BG);
        assert_eq!(pixel(&frame, 10, 3, 3), BG);
    }

    #[test]
    fn missing_texture_is_reported_and_drawn_as_marker() {
        let mut world = world(16, 16);
        world.spawn(Vec2::new(8.0, 8.0), RenderableDesc::sprite("player"));
        world.apply_pending();

        let mut frame = vec![0u8; 16 * 16 * 4];
        let missing = draw_world(&mut Canvas::new(&mut frame, 16, 16), &world);

        assert_eq!(missing, vec!["player"]);
        assert_eq!(pixel(&frame, 16, 8, 8), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn stroked_rect_draws_border_over_fill() {
        let mut world = world(20, 20);
        world.spawn(
            Vec2::new(10.0, 10.0),
            RenderableDesc {
                kind: RenderableKind::Rect {
                    size: Vec2::new(10.0, 10.0),
                    fill: RED,
                    stroke: Some(WHITE),
                },
                debug_name: "portal",
            },
        );
        world.apply_pending();

        let mut frame = vec![0u8; 20 * 20 * 4];
        draw_world(&mut Canvas::new(&mut frame, 20, 20), &world);

        assert_eq!(pixel(&frame, 20, 5, 5), WHITE);
        assert_eq!(pixel(&frame, 20, 6, 10), WHITE);
        assert_eq!(pixel(&frame, 20, 10, 10), RED);
        assert_eq!(pixel(&frame, 20, 15, 15), BG);
    }

    #[test]
    fn tile_sprite_repeats_scaled_texture_around_center() {
        let mut world = world(8, 4);
        let mut canvas_texture = crate::app::texture::TextureCanvas::new(2, 1);
        canvas_texture.fill_rect(0, 0, 1, 1, RED);
        world.textures_mut().insert("stripe", canvas_texture.finish());
        world.spawn(
            Vec2::new(4.0, 2.0),
            RenderableDesc {
                kind: RenderableKind::TileSprite {
                    texture: "stripe",
                    size: Vec2::new(8.0, 2.0),
                    tile_scale: Vec2::new(2.0, 2.0),
                },
                debug_name: "ground",
            },
        );
        world.apply_pending();

        let mut frame = vec![0u8; 8 * 4 * 4];
        draw_world(&mut Canvas::new(&mut frame, 8, 4), &world);

        assert_eq!(pixel(&frame, 8, 0, 1), RED);
        assert_eq!(pixel(&frame, 8, 1, 2), RED);
        assert_eq!(pixel(&frame, 8, 2, 1), BG);
        assert_eq!(pixel(&frame, 8, 4, 1), RED);
        assert_eq!(pixel(&frame, 8, 0, 0), BG);
        assert_eq!(pixel(&frame, 8, 0, 3), BG);
    }

    #[test]
    fn later_spawns_draw_on_top() {
        let mut world = world(4, 4);
        world.textures_mut().insert("red", Texture::filled(4, 4, RED));
        world.textures_mut().insert("white", Texture::filled(4, 4, WHITE));
        world.spawn(Vec2::new(2.0, 2.0), RenderableDesc::sprite("red"));
        world.spawn(Vec2::new(2.0, 2.0), RenderableDesc::sprite("white"));
        world.apply_pending();

        let mut frame = vec![0u8; 4 * 4 * 4];
        draw_world(&mut Canvas::new(&mut frame, 4, 4), &world);

        assert!(frame.chunks_exact(4).all(|chunk| chunk == WHITE));
    }
}
