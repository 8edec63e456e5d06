use crate::app::texture::{Rgba, Texture};

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if color[3] == 0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        if color[3] == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let alpha = color[3] as u32;
        for channel in 0..3 {
            let src = color[channel] as u32;
            let old = dst[channel] as u32;
            dst[channel] = ((src * alpha + old * (255 - alpha)) / 255) as u8;
        }
        dst[3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(rect_width).min(self.width as i32);
        let end_y = y.saturating_add(rect_height).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        thickness: i32,
        color: Rgba,
    ) {
        if rect_width <= 0 || rect_height <= 0 {
            return;
        }
        let t = thickness.clamp(1, rect_width.min(rect_height));
        self.fill_rect(x, y, rect_width, t, color);
        self.fill_rect(x, y + rect_height - t, rect_width, t, color);
        self.fill_rect(x, y + t, t, rect_height - 2 * t, color);
        self.fill_rect(x + rect_width - t, y + t, t, rect_height - 2 * t, color);
    }

    pub fn blit_scaled(
        &mut self,
        texture: &Texture,
        x: i32,
        y: i32,
        dest_width: i32,
        dest_height: i32,
        flip_x: bool,
    ) {
        if dest_width <= 0 || dest_height <= 0 || texture.width() == 0 || texture.height() == 0 {
            return;
        }
        for dy in 0..dest_height {
            let src_y = (dy as i64 * texture.height() as i64 / dest_height as i64) as u32;
            for dx in 0..dest_width {
                let mut src_x = (dx as i64 * texture.width() as i64 / dest_width as i64) as u32;
                if flip_x {
                    src_x = texture.width() - 1 - src_x;
                }
                if let Some(color) = texture.pixel(src_x, src_y) {
                    self.blend_pixel(x + dx, y + dy, color);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blit_tiled(
        &mut self,
        texture: &Texture,
        x: i32,
        y: i32,
        dest_width: i32,
        dest_height: i32,
        tile_width: i32,
        tile_height: i32,
    ) {
        if tile_width <= 0 || tile_height <= 0 || texture.width() == 0 || texture.height() == 0 {
            return;
        }
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(dest_width).min(self.width as i32);
        let end_y = y.saturating_add(dest_height).min(self.height as i32);
        for py in start_y..end_y {
            let local_y = (py - y).rem_euclid(tile_height);
            let src_y = (local_y as i64 * texture.height() as i64 / tile_height as i64) as u32;
            for px in start_x..end_x {
                let local_x = (px - x).rem_euclid(tile_width);
                let src_x = (local_x as i64 * texture.width() as i64 / tile_width as i64) as u32;
                if let Some(color) = texture.pixel(src_x, src_y) {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }
}
