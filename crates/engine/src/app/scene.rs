use tracing::info;

use super::input::{ActionStates, InputAction};
use super::world::SceneWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Boot,
    Hub,
    Level,
}

impl SceneKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneKey::Boot => "boot",
            SceneKey::Hub => "hub",
            SceneKey::Level => "level",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneParams {
    pub world_id: Option<String>,
}

impl SceneParams {
    pub fn with_world_id(world_id: impl Into<String>) -> Self {
        Self {
            world_id: Some(world_id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Start(SceneKey, SceneParams),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.force_pressed(action);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half_size: Vec2,
}

impl Rect {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_size: Vec2::new(size.x * 0.5, size.y * 0.5),
        }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_size.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_size.x
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half_size.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_size.y
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

pub trait Scene {
    fn load(&mut self, params: &SceneParams, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn debug_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

pub struct SceneSet {
    pub boot: Box<dyn Scene>,
    pub hub: Box<dyn Scene>,
    pub level: Box<dyn Scene>,
}

pub struct SceneMachine {
    scenes: SceneSet,
    world: SceneWorld,
    active_scene: SceneKey,
    is_loaded: bool,
}

impl SceneMachine {
    pub fn new(scenes: SceneSet, world: SceneWorld, initial_scene: SceneKey) -> Self {
        Self {
            scenes,
            world,
            active_scene: initial_scene,
            is_loaded: false,
        }
    }

    pub fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn load_active(&mut self) {
        if self.is_loaded {
            return;
        }
        self.start(self.active_scene, SceneParams::default());
    }

    pub fn tick(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> bool {
        let command = self.update_active(fixed_dt_seconds, input);
        self.world.step_physics(fixed_dt_seconds);
        self.world.apply_pending();
        match command {
            SceneCommand::Start(next_scene, params) => {
                self.start(next_scene, params);
                true
            }
            SceneCommand::None => false,
        }
    }

    pub fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let active = self.active_scene;
        let (scene, world) = self.scene_and_world_mut(active);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub fn start(&mut self, next_scene: SceneKey, params: SceneParams) {
        if self.is_loaded {
            let current = self.active_scene;
            let (scene, world) = self.scene_and_world_mut(current);
            scene.unload(world);
        }
        self.world.clear();
        {
            let (scene, world) = self.scene_and_world_mut(next_scene);
            scene.load(&params, world);
        }
        self.world.apply_pending();
        self.active_scene = next_scene;
        self.is_loaded = true;
        info!(
            scene = next_scene.as_str(),
            world_id = params.world_id.as_deref().unwrap_or("-"),
            entity_count = self.world.entity_count(),
            "scene_started"
        );
    }

    pub fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        let current = self.active_scene;
        let (scene, world) = self.scene_and_world_mut(current);
        scene.unload(world);
        self.world.clear();
        self.is_loaded = false;
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub fn debug_title_active(&self) -> Option<String> {
        self.scene_ref(self.active_scene).debug_title()
    }

    pub fn debug_lines_active(&self) -> Vec<String> {
        self.scene_ref(self.active_scene).debug_lines()
    }

    fn scene_ref(&self, key: SceneKey) -> &dyn Scene {
        match key {
            SceneKey::Boot => self.scenes.boot.as_ref(),
            SceneKey::Hub => self.scenes.hub.as_ref(),
            SceneKey::Level => self.scenes.level.as_ref(),
        }
    }

    fn scene_and_world_mut(&mut self, key: SceneKey) -> (&mut dyn Scene, &mut SceneWorld) {
        let scene = match key {
            SceneKey::Boot => self.scenes.boot.as_mut(),
            SceneKey::Hub => self.scenes.hub.as_mut(),
            SceneKey::Level => self.scenes.level.as_mut(),
        };
        (scene, &mut self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::texture::Texture;
    use crate::app::world::{RenderableDesc, RenderableKind};
    use crate::{PhysicsConfig, Viewport};

    const DT: f32 = 1.0 / 60.0;

    fn test_world() -> SceneWorld {
        SceneWorld::new(
            Viewport {
                width: 320,
                height: 240,
            },
            PhysicsConfig::default(),
        )
    }

    fn marker() -> RenderableDesc {
        RenderableDesc {
            kind: RenderableKind::Rect {
                size: Vec2::new(4.0, 4.0),
                fill: [255, 255, 255, 255],
                stroke: None,
            },
            debug_name: "marker",
        }
    }

    struct ScriptedScene {
        spawn_count: usize,
        next: Option<(SceneKey, SceneParams)>,
        after_ticks: u32,
        ticks: u32,
        loads: u32,
        unloads: u32,
        last_params: Option<SceneParams>,
    }

    impl ScriptedScene {
        fn new(spawn_count: usize) -> Self {
            Self {
                spawn_count,
                next: None,
                after_ticks: 0,
                ticks: 0,
                loads: 0,
                unloads: 0,
                last_params: None,
            }
        }

        fn then(mut self, key: SceneKey, params: SceneParams, after_ticks: u32) -> Self {
            self.next = Some((key, params));
            self.after_ticks = after_ticks;
            self
        }
    }

    impl Scene for ScriptedScene {
        fn load(&mut self, params: &SceneParams, world: &mut SceneWorld) {
            self.loads += 1;
            self.ticks = 0;
            self.last_params = Some(params.clone());
            for _ in 0..self.spawn_count {
                world.spawn(Vec2::default(), marker());
            }
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            self.ticks += 1;
            match &self.next {
                Some((key, params)) if self.ticks > self.after_ticks => {
                    SceneCommand::Start(*key, params.clone())
                }
                _ => SceneCommand::None,
            }
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.unloads += 1;
        }

        fn debug_lines(&self) -> Vec<String> {
            let world_id = self
                .last_params
                .as_ref()
                .and_then(|params| params.world_id.clone())
                .unwrap_or_else(|| "-".to_string());
            vec![
                format!("loads: {} unloads: {}", self.loads, self.unloads),
                format!("world: {world_id}"),
            ]
        }
    }

    struct TextureBootScene;

    impl Scene for TextureBootScene {
        fn load(&mut self, _params: &SceneParams, world: &mut SceneWorld) {
            world
                .textures_mut()
                .insert("dot", Texture::filled(2, 2, [1, 2, 3, 255]));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            SceneCommand::Start(SceneKey::Hub, SceneParams::default())
        }

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    fn machine_with(
        boot: Box<dyn Scene>,
        hub: Box<dyn Scene>,
        level: Box<dyn Scene>,
    ) -> SceneMachine {
        SceneMachine::new(SceneSet { boot, hub, level }, test_world(), SceneKey::Boot)
    }

    #[test]
    fn boot_hands_off_to_hub_on_first_tick() {
        let mut machine = machine_with(
            Box::new(ScriptedScene::new(0).then(SceneKey::Hub, SceneParams::default(), 0)),
            Box::new(ScriptedScene::new(3)),
            Box::new(ScriptedScene::new(1)),
        );
        machine.load_active();
        assert_eq!(machine.active_scene(), SceneKey::Boot);

        assert!(machine.tick(DT, &InputSnapshot::empty()));
        assert_eq!(machine.active_scene(), SceneKey::Hub);
        assert_eq!(machine.world().entity_count(), 3);
    }

    #[test]
    fn start_forwards_params_to_target_scene() {
        let mut machine = machine_with(
            Box::new(ScriptedScene::new(0)),
            Box::new(ScriptedScene::new(0)),
            Box::new(ScriptedScene::new(0)),
        );
        machine.start(SceneKey::Level, SceneParams::with_world_id("jungle"));

        assert_eq!(machine.active_scene(), SceneKey::Level);
        assert_eq!(
            machine.debug_lines_active(),
            vec!["loads: 1 unloads: 0".to_string(), "world: jungle".to_string()]
        );
    }

    #[test]
    fn restarting_scene_rebuilds_world_from_scratch() {
        let mut machine = machine_with(
            Box::new(ScriptedScene::new(0)),
            Box::new(ScriptedScene::new(2).then(SceneKey::Level, SceneParams::default(), 0)),
            Box::new(ScriptedScene::new(1).then(SceneKey::Hub, SceneParams::default(), 0)),
        );
        machine.start(SceneKey::Hub, SceneParams::default());
        let first_ids: Vec<EntityId> = machine
            .world()
            .entities()
            .iter()
            .map(|entity| entity.id)
            .collect();

        assert!(machine.tick(DT, &InputSnapshot::empty()));
        assert_eq!(machine.active_scene(), SceneKey::Level);
        assert_eq!(machine.world().entity_count(), 1);

        assert!(machine.tick(DT, &InputSnapshot::empty()));
        assert_eq!(machine.active_scene(), SceneKey::Hub);
        assert_eq!(machine.world().entity_count(), 2);
        let second_ids: Vec<EntityId> = machine
            .world()
            .entities()
            .iter()
            .map(|entity| entity.id)
            .collect();
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    }

    #[test]
    fn textures_survive_scene_changes() {
        let mut machine = machine_with(
            Box::new(TextureBootScene),
            Box::new(ScriptedScene::new(0)),
            Box::new(ScriptedScene::new(0)),
        );
        machine.load_active();
        assert!(machine.tick(DT, &InputSnapshot::empty()));
        machine.start(SceneKey::Level, SceneParams::default());

        assert!(machine.world().textures().get("dot").is_some());
    }

    #[test]
    fn shutdown_clears_world_and_is_idempotent() {
        let mut machine = machine_with(
            Box::new(ScriptedScene::new(0)),
            Box::new(ScriptedScene::new(2)),
            Box::new(ScriptedScene::new(0)),
        );
        machine.start(SceneKey::Hub, SceneParams::default());
        machine.shutdown();
        machine.shutdown();

        assert!(!machine.is_loaded());
        assert_eq!(machine.world().entity_count(), 0);
        assert_eq!(
            machine.debug_lines_active()[0],
            "loads: 1 unloads: 1".to_string()
        );
    }

    #[test]
    fn just_pressed_is_separate_from_held() {
        let held = InputSnapshot::empty().with_action_down(InputAction::Jump, true);
        assert!(held.is_down(InputAction::Jump));
        assert!(held.just_pressed(InputAction::Jump));

        let tapped = InputSnapshot::empty().with_action_pressed(InputAction::Interact);
        assert!(!tapped.is_down(InputAction::Interact));
        assert!(tapped.just_pressed(InputAction::Interact));
    }

    #[test]
    fn rect_edges_touching_do_not_intersect() {
        let a = Rect::from_center_size(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Rect::from_center_size(Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0));
        let c = Rect::from_center_size(Vec2::new(1.5, 0.5), Vec2::new(2.0, 2.0));

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }
}
