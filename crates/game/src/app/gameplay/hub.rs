use engine::{
    BodyDesc, EntityId, InputAction, InputSnapshot, RenderableDesc, RenderableKind, Rgba, Scene,
    SceneCommand, SceneKey, SceneParams, SceneWorld, TextAnchor, Vec2,
};
use tracing::info;

use super::movement::{Actor, MovementProfile};
use super::worlds::{WorldDescriptor, WORLDS};
use super::{
    apply_motion, movement_input, spawn_player, TEXTURE_PLATFORM, TEXT_DIM, TEXT_WHITE,
};

const BACKGROUND: Rgba = [0x11, 0x12, 0x18, 255];
const PORTAL_COLOR: Rgba = [0x2b, 0x6f, 0x77, 255];
const PORTAL_ACTIVE_COLOR: Rgba = [0x4c, 0xc9, 0xf0, 255];
const PORTAL_STROKE: Rgba = [255, 255, 255, 255];
const PORTAL_SIZE: Vec2 = Vec2::new(48.0, 80.0);
const PORTAL_SPACING: f32 = 120.0;
const PORTAL_LABEL_OFFSET_Y: f32 = 56.0;
const GROUND_HEIGHT: f32 = 40.0;
const GROUND_TILE_SCALE: f32 = 2.0;
const PLAYER_SPAWN_OFFSET_Y: f32 = 150.0;

const TITLE: &str = "Grand Central Library";
const SUBTITLE: &str = "Collect overdue books across the worlds. Press E to enter a portal.";
const CONTROLS_HINT: &str = "Move: A/D   Jump: W/Space   Dash: Shift   Interact: E";

#[derive(Debug)]
struct Portal {
    world: &'static WorldDescriptor,
    entity: EntityId,
    active: bool,
}

#[derive(Debug)]
struct HubState {
    player: EntityId,
    actor: Actor,
    portals: Vec<Portal>,
}

pub(crate) struct HubScene {
    profile: MovementProfile,
    state: Option<HubState>,
}

impl HubScene {
    pub(crate) fn new(profile: MovementProfile) -> Self {
        Self {
            profile,
            state: None,
        }
    }
}

fn portal_centers(width: f32, height: f32) -> impl Iterator<Item = Vec2> {
    let start_x = width * 0.5 - (WORLDS.len() - 1) as f32 * 0.5 * PORTAL_SPACING;
    let y = height - GROUND_HEIGHT - PORTAL_SIZE.y * 0.5;
    (0..WORLDS.len()).map(move |index| Vec2::new(start_x + index as f32 * PORTAL_SPACING, y))
}

impl Scene for HubScene {
    fn load(&mut self, _params: &SceneParams, world: &mut SceneWorld) {
        let viewport = world.viewport();
        let (w, h) = (viewport.width as f32, viewport.height as f32);
        world.set_background(BACKGROUND);

        world.spawn_with_body(
            Vec2::new(w * 0.5, h - GROUND_HEIGHT * 0.5),
            RenderableDesc {
                kind: RenderableKind::TileSprite {
                    texture: TEXTURE_PLATFORM,
                    size: Vec2::new(w, GROUND_HEIGHT),
                    tile_scale: Vec2::new(GROUND_TILE_SCALE, GROUND_TILE_SCALE),
                },
                debug_name: "ground",
            },
            BodyDesc::solid(Vec2::new(w, GROUND_HEIGHT)),
        );

        world.spawn(
            Vec2::new(viewport.center_x(), 40.0),
            RenderableDesc::text(TITLE, 4, TEXT_WHITE, TextAnchor::Center),
        );
        world.spawn(
            Vec2::new(viewport.center_x(), 80.0),
            RenderableDesc::text(SUBTITLE, 2, TEXT_DIM, TextAnchor::Center),
        );
        world.spawn(
            Vec2::new(10.0, 10.0),
            RenderableDesc::text(CONTROLS_HINT, 2, TEXT_WHITE, TextAnchor::TopLeft),
        );

        let portals = WORLDS
            .iter()
            .zip(portal_centers(w, h))
            .map(|(descriptor, center)| {
                let entity = world.spawn_with_body(
                    center,
                    RenderableDesc {
                        kind: RenderableKind::Rect {
                            size: PORTAL_SIZE,
                            fill: PORTAL_COLOR,
                            stroke: Some(PORTAL_STROKE),
                        },
                        debug_name: "portal",
                    },
                    BodyDesc::sensor(PORTAL_SIZE),
                );
                world.spawn(
                    Vec2::new(center.x, center.y - PORTAL_LABEL_OFFSET_Y),
                    RenderableDesc::text(descriptor.name, 2, TEXT_WHITE, TextAnchor::Center),
                );
                Portal {
                    world: descriptor,
                    entity,
                    active: false,
                }
            })
            .collect();

        let player = spawn_player(world, Vec2::new(w * 0.5, h - PLAYER_SPAWN_OFFSET_Y));
        self.state = Some(HubState {
            player,
            actor: Actor::default(),
            portals,
        });
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(state) = self.state.as_mut() else {
            return SceneCommand::None;
        };

        let grounded = world.is_blocked_down(state.player);
        let command = state.actor.step(
            &self.profile,
            movement_input(input, grounded),
            fixed_dt_seconds,
        );
        apply_motion(world, state.player, command, state.actor.facing());

        for portal in &mut state.portals {
            let active = world.overlaps(state.player, portal.entity);
            if active != portal.active {
                let fill = if active {
                    PORTAL_ACTIVE_COLOR
                } else {
                    PORTAL_COLOR
                };
                world.set_rect_fill(portal.entity, fill);
                portal.active = active;
            }
        }

        if input.just_pressed(InputAction::Interact) {
            if let Some(portal) = state.portals.iter().find(|portal| portal.active) {
                info!(world_id = portal.world.id, "portal_entered");
                return SceneCommand::Start(
                    SceneKey::Level,
                    SceneParams::with_world_id(portal.world.id),
                );
            }
        }

        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.state = None;
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!("Archivist - {TITLE}"))
    }

    fn debug_lines(&self) -> Vec<String> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let near = state
            .portals
            .iter()
            .find(|portal| portal.active)
            .map_or("-", |portal| portal.world.id);
        vec![
            format!("near portal: {near}"),
            format!("portals: {}", state.portals.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portals_are_evenly_spaced_and_centred() {
        let centers: Vec<Vec2> = portal_centers(1024.0, 576.0).collect();

        assert_eq!(centers.len(), 6);
        assert_eq!(centers[0].x, 212.0);
        assert_eq!(centers[5].x, 812.0);
        for pair in centers.windows(2) {
            assert_eq!(pair[1].x - pair[0].x, PORTAL_SPACING);
        }
        let middle = (centers[0].x + centers[5].x) * 0.5;
        assert_eq!(middle, 512.0);
    }

    #[test]
    fn portals_stand_on_the_floor() {
        let center = portal_centers(1024.0, 576.0).next().expect("portal");
        assert_eq!(center.y + PORTAL_SIZE.y * 0.5, 576.0 - GROUND_HEIGHT);
    }
}
