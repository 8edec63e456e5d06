use std::collections::HashMap;

pub type Rgba = [u8; 4];

const TRANSPARENT: Rgba = [0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = TRANSPARENT;
        color.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(color)
    }
}

#[derive(Debug, Clone)]
pub struct TextureCanvas {
    texture: Texture,
}

impl TextureCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            texture: Texture::filled(width, height, TRANSPARENT),
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        self.fill_where(color, |px, py| {
            px >= x as f32 && px < (x + width) as f32 && py >= y as f32 && py < (y + height) as f32
        });
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        radius: i32,
        color: Rgba,
    ) {
        let radius = radius.clamp(0, width.min(height) / 2) as f32;
        let (left, top) = (x as f32, y as f32);
        let (right, bottom) = ((x + width) as f32, (y + height) as f32);
        self.fill_where(color, |px, py| {
            if px < left || px >= right || py < top || py >= bottom {
                return false;
            }
            let corner_x = px.clamp(left + radius, right - radius);
            let corner_y = py.clamp(top + radius, bottom - radius);
            let (dx, dy) = (px - corner_x, py - corner_y);
            dx * dx + dy * dy <= radius * radius
        });
    }

    pub fn fill_circle(&mut self, center_x: i32, center_y: i32, radius: i32, color: Rgba) {
        let (cx, cy, r) = (center_x as f32, center_y as f32, radius as f32);
        self.fill_where(color, |px, py| {
            let (dx, dy) = (px - cx, py - cy);
            dx * dx + dy * dy <= r * r
        });
    }

    pub fn finish(self) -> Texture {
        self.texture
    }

    fn fill_where(&mut self, color: Rgba, covers: impl Fn(f32, f32) -> bool) {
        let width = self.texture.width as usize;
        for (index, pixel) in self.texture.pixels.chunks_exact_mut(4).enumerate() {
            let px = (index % width) as f32 + 0.5;
            let py = (index / width) as f32 + 0.5;
            if covers(px, py) {
                pixel.copy_from_slice(&color);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextureRegistry {
    textures: HashMap<String, Texture>,
}

impl TextureRegistry {
    pub fn insert(&mut self, key: impl Into<String>, texture: Texture) {
        self.textures.insert(key.into(), texture);
    }

    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
