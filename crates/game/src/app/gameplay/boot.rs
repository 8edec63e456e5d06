use engine::{
    InputSnapshot, Rgba, Scene, SceneCommand, SceneKey, SceneParams, SceneWorld, Texture,
    TextureCanvas,
};
use tracing::debug;

use super::{TEXTURE_BOOK, TEXTURE_PLATFORM, TEXTURE_PLAYER};

const ROBE_COLOR: Rgba = [0x4b, 0x2e, 0x83, 255];
const HAIR_COLOR: Rgba = [0xea, 0xd0, 0x7b, 255];
const BOOK_COLOR: Rgba = [0xd9, 0x5f, 0x02, 255];
const PLATFORM_COLOR: Rgba = [0x6b, 0x70, 0x5c, 255];

#[derive(Debug, Default)]
pub(crate) struct BootScene {
    generated: bool,
}

impl Scene for BootScene {
    fn load(&mut self, _params: &SceneParams, world: &mut SceneWorld) {
        let textures = world.textures_mut();
        textures.insert(TEXTURE_PLAYER, player_texture());
        textures.insert(TEXTURE_BOOK, Texture::filled(16, 12, BOOK_COLOR));
        textures.insert(TEXTURE_PLATFORM, Texture::filled(64, 16, PLATFORM_COLOR));
        debug!(texture_count = textures.len(), "textures_generated");
        self.generated = true;
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        _input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if self.generated {
            SceneCommand::Start(SceneKey::Hub, SceneParams::default())
        } else {
            SceneCommand::None
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.generated = false;
    }

    fn debug_lines(&self) -> Vec<String> {
        vec![format!("textures ready: {}", self.generated)]
    }
}

fn player_texture() -> Texture {
    let mut canvas = TextureCanvas::new(24, 32);
    canvas.fill_rounded_rect(0, 8, 24, 24, 4, ROBE_COLOR);
    canvas.fill_circle(12, 6, 6, HAIR_COLOR);
    canvas.finish()
}
