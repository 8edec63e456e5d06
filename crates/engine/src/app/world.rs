use super::physics::{ArcadePhysics, BodyDesc, PhysicsConfig};
use super::rendering::Viewport;
use super::scene::{EntityId, Rect, Vec2};
use super::texture::{Rgba, TextureRegistry};

const DEFAULT_BACKGROUND: Rgba = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderableKind {
    Sprite {
        texture: &'static str,
        scale: Vec2,
        flip_x: bool,
    },
    TileSprite {
        texture: &'static str,
        size: Vec2,
        tile_scale: Vec2,
    },
    Rect {
        size: Vec2,
        fill: Rgba,
        stroke: Option<Rgba>,
    },
    Text {
        text: String,
        scale: i32,
        color: Rgba,
        anchor: TextAnchor,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
}

impl RenderableDesc {
    pub fn sprite(texture: &'static str) -> Self {
        Self {
            kind: RenderableKind::Sprite {
                texture,
                scale: Vec2::new(1.0, 1.0),
                flip_x: false,
            },
            debug_name: texture,
        }
    }

    pub fn text(text: impl Into<String>, scale: i32, color: Rgba, anchor: TextAnchor) -> Self {
        Self {
            kind: RenderableKind::Text {
                text: text.into(),
                scale,
                color,
                anchor,
            },
            debug_name: "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub renderable: RenderableDesc,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    physics: ArcadePhysics,
    textures: TextureRegistry,
    viewport: Viewport,
    background: Rgba,
}

impl SceneWorld {
    pub fn new(viewport: Viewport, physics_config: PhysicsConfig) -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            pending_spawns: Vec::new(),
            pending_despawns: Vec::new(),
            physics: ArcadePhysics::new(
                physics_config,
                Vec2::new(viewport.width as f32, viewport.height as f32),
            ),
            textures: TextureRegistry::default(),
            viewport,
            background: DEFAULT_BACKGROUND,
        }
    }

    pub fn spawn(&mut self, position: Vec2, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            position,
            renderable,
        });
        id
    }

    pub fn spawn_with_body(
        &mut self,
        position: Vec2,
        renderable: RenderableDesc,
        body: BodyDesc,
    ) -> EntityId {
        let id = self.spawn(position, renderable);
        self.physics.add_body(id, position, body);
        id
    }

    /// Queues removal; the physics body is dropped right away so the entity
    /// stops answering overlap queries this tick.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.physics.remove_body(id);
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_spawns.is_empty() {
            self.entities.append(&mut self.pending_spawns);
        }

        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_unstable();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_despawns.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.physics.clear();
        self.background = DEFAULT_BACKGROUND;
    }

    pub fn step_physics(&mut self, dt_seconds: f32) {
        self.physics.step(dt_seconds);
        for body in self.physics.bodies() {
            if let Some(entity) = self
                .entities
                .iter_mut()
                .chain(self.pending_spawns.iter_mut())
                .find(|entity| entity.id == body.entity)
            {
                entity.position = body.bounds.center;
            }
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|entity| entity.id == id)
    }

    pub fn set_text(&mut self, id: EntityId, value: impl Into<String>) -> bool {
        match self.find_entity_mut(id).map(|entity| &mut entity.renderable.kind) {
            Some(RenderableKind::Text { text, .. }) => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_rect_fill(&mut self, id: EntityId, color: Rgba) -> bool {
        match self.find_entity_mut(id).map(|entity| &mut entity.renderable.kind) {
            Some(RenderableKind::Rect { fill, .. }) => {
                *fill = color;
                true
            }
            _ => false,
        }
    }

    pub fn set_flip_x(&mut self, id: EntityId, flipped: bool) -> bool {
        match self.find_entity_mut(id).map(|entity| &mut entity.renderable.kind) {
            Some(RenderableKind::Sprite { flip_x, .. }) => {
                *flip_x = flipped;
                true
            }
            _ => false,
        }
    }

    pub fn body_bounds(&self, id: EntityId) -> Option<Rect> {
        self.physics.body(id).map(|body| body.bounds)
    }

    pub fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.physics.body(id).map(|body| body.velocity)
    }

    pub fn set_velocity_x(&mut self, id: EntityId, velocity_x: f32) {
        if let Some(body) = self.physics.body_mut(id) {
            body.velocity.x = velocity_x;
        }
    }

    pub fn set_velocity_y(&mut self, id: EntityId, velocity_y: f32) {
        if let Some(body) = self.physics.body_mut(id) {
            body.velocity.y = velocity_y;
        }
    }

    pub fn is_blocked_down(&self, id: EntityId) -> bool {
        self.physics
            .body(id)
            .map(|body| body.blocked.down)
            .unwrap_or(false)
    }

    pub fn overlaps(&self, a: EntityId, b: EntityId) -> bool {
        self.physics.overlaps(a, b)
    }

    pub fn physics(&self) -> &ArcadePhysics {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut ArcadePhysics {
        &mut self.physics
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = color;
    }
}
