mod boot;
mod hub;
mod level;
pub(crate) mod movement;
mod worlds;

use engine::{
    BodyDesc, EntityId, InputAction, InputSnapshot, RenderableDesc, Rgba, SceneSet, SceneWorld,
    Vec2,
};

use super::tuning::Tuning;
use boot::BootScene;
use hub::HubScene;
use level::LevelScene;
use movement::{Facing, MotionCommand, MovementInput};

const TEXTURE_PLAYER: &str = "player";
const TEXTURE_BOOK: &str = "book";
const TEXTURE_PLATFORM: &str = "platform";

const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 32.0);
const PLAYER_BOUNCE: f32 = 0.05;

const TEXT_WHITE: Rgba = [255, 255, 255, 255];
const TEXT_DIM: Rgba = [0xdd, 0xdd, 0xdd, 255];

pub(crate) fn build_scene_set(tuning: &Tuning) -> SceneSet {
    SceneSet {
        boot: Box::new(BootScene::default()),
        hub: Box::new(HubScene::new(tuning.hub_movement)),
        level: Box::new(LevelScene::new(tuning.level_movement)),
    }
}

fn spawn_player(world: &mut SceneWorld, position: Vec2) -> EntityId {
    world.spawn_with_body(
        position,
        RenderableDesc::sprite(TEXTURE_PLAYER),
        BodyDesc::dynamic(PLAYER_SIZE)
            .with_bounce_y(PLAYER_BOUNCE)
            .with_world_bounds(),
    )
}

fn movement_input(input: &InputSnapshot, grounded: bool) -> MovementInput {
    MovementInput {
        left: input.is_down(InputAction::MoveLeft),
        right: input.is_down(InputAction::MoveRight),
        jump_pressed: input.just_pressed(InputAction::Jump),
        dash_pressed: input.just_pressed(InputAction::Dash),
        grounded,
    }
}

fn apply_motion(world: &mut SceneWorld, player: EntityId, command: MotionCommand, facing: Facing) {
    if let Some(velocity_x) = command.velocity_x {
        world.set_velocity_x(player, velocity_x);
    }
    if let Some(velocity_y) = command.velocity_y {
        world.set_velocity_y(player, velocity_y);
    }
    world.set_flip_x(player, facing == Facing::Left);
}
