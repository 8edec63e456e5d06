use serde::Deserialize;

use super::scene::{EntityId, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Downward acceleration in px/s². Screen space: +y points down.
    pub gravity_y: f32,
    pub rest_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: 900.0,
            rest_speed: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
    Sensor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub size: Vec2,
    pub bounce_y: f32,
    pub collide_world_bounds: bool,
}

impl BodyDesc {
    pub fn dynamic(size: Vec2) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            size,
            bounce_y: 0.0,
            collide_world_bounds: false,
        }
    }

    pub fn solid(size: Vec2) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(size)
        }
    }

    pub fn sensor(size: Vec2) -> Self {
        Self {
            kind: BodyKind::Sensor,
            ..Self::dynamic(size)
        }
    }

    pub fn with_bounce_y(mut self, bounce_y: f32) -> Self {
        self.bounce_y = bounce_y.clamp(0.0, 1.0);
        self
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub entity: EntityId,
    pub kind: BodyKind,
    pub bounds: Rect,
    pub velocity: Vec2,
    pub bounce_y: f32,
    pub collide_world_bounds: bool,
    pub blocked: Blocked,
}

#[derive(Debug, Clone)]
pub struct ArcadePhysics {
    config: PhysicsConfig,
    world_bounds: Rect,
    bodies: Vec<Body>,
}

impl ArcadePhysics {
    pub fn new(config: PhysicsConfig, world_size: Vec2) -> Self {
        Self {
            config,
            world_bounds: Rect::from_center_size(
                Vec2::new(world_size.x * 0.5, world_size.y * 0.5),
                world_size,
            ),
            bodies: Vec::new(),
        }
    }

    pub fn config(&self) -> PhysicsConfig {
        self.config
    }

    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    pub fn add_body(&mut self, entity: EntityId, position: Vec2, desc: BodyDesc) {
        self.remove_body(entity);
        self.bodies.push(Body {
            entity,
            kind: desc.kind,
            bounds: Rect::from_center_size(position, desc.size),
            velocity: Vec2::default(),
            bounce_y: desc.bounce_y,
            collide_world_bounds: desc.collide_world_bounds,
            blocked: Blocked::default(),
        });
    }

    pub fn remove_body(&mut self, entity: EntityId) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|body| body.entity != entity);
        self.bodies.len() != before
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, entity: EntityId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.entity == entity)
    }

    pub fn body_mut(&mut self, entity: EntityId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.entity == entity)
    }

    pub fn overlaps(&self, a: EntityId, b: EntityId) -> bool {
        match (self.body(a), self.body(b)) {
            (Some(first), Some(second)) => first.bounds.intersects(&second.bounds),
            _ => false,
        }
    }

    pub fn step(&mut self, dt_seconds: f32) {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return;
        }

        let solids: Vec<Rect> = self
            .bodies
            .iter()
            .filter(|body| body.kind == BodyKind::Static)
            .map(|body| body.bounds)
            .collect();
        let gravity_y = self.config.gravity_y;
        let rest_speed = self.config.rest_speed;
        let world_bounds = self.world_bounds;

        for body in self
            .bodies
            .iter_mut()
            .filter(|body| body.kind == BodyKind::Dynamic)
        {
            body.blocked = Blocked::default();
            body.velocity.y += gravity_y * dt_seconds;

            body.bounds.center.x += body.velocity.x * dt_seconds;
            for solid in &solids {
                if body.bounds.intersects(solid) {
                    separate_x(body, solid);
                }
            }

            body.bounds.center.y += body.velocity.y * dt_seconds;
            for solid in &solids {
                if body.bounds.intersects(solid) {
                    separate_y(body, solid, rest_speed);
                }
            }

            if body.collide_world_bounds {
                keep_inside(body, &world_bounds, rest_speed);
            }
        }
    }
}

fn separate_x(body: &mut Body, solid: &Rect) {
    let moving_right = body.velocity.x > 0.0
        || (body.velocity.x == 0.0 && body.bounds.center.x < solid.center.x);
    if moving_right {
        body.bounds.center.x = solid.left() - body.bounds.half_size.x;
        body.blocked.right = true;
    } else {
        body.bounds.center.x = solid.right() + body.bounds.half_size.x;
        body.blocked.left = true;
    }
    body.velocity.x = 0.0;
}

fn separate_y(body: &mut Body, solid: &Rect, rest_speed: f32) {
    let falling = body.velocity.y > 0.0
        || (body.velocity.y == 0.0 && body.bounds.center.y < solid.center.y);
    if falling {
        body.bounds.center.y = solid.top() - body.bounds.half_size.y;
        body.blocked.down = true;
        body.velocity.y = -rebound_speed(body.velocity.y, body.bounce_y, rest_speed);
    } else {
        body.bounds.center.y = solid.bottom() + body.bounds.half_size.y;
        body.blocked.up = true;
        body.velocity.y = rebound_speed(body.velocity.y, body.bounce_y, rest_speed);
    }
}

fn keep_inside(body: &mut Body, bounds: &Rect, rest_speed: f32) {
    let half = body.bounds.half_size;
    if body.bounds.left() < bounds.left() {
        body.bounds.center.x = bounds.left() + half.x;
        body.blocked.left = true;
        body.velocity.x = body.velocity.x.max(0.0);
    } else if body.bounds.right() > bounds.right() {
        body.bounds.center.x = bounds.right() - half.x;
        body.blocked.right = true;
        body.velocity.x = body.velocity.x.min(0.0);
    }

    if body.bounds.top() < bounds.top() {
        body.bounds.center.y = bounds.top() + half.y;
        body.blocked.up = true;
        body.velocity.y = body.velocity.y.max(0.0);
    } else if body.bounds.bottom() >= bounds.bottom() {
        body.bounds.center.y = bounds.bottom() - half.y;
        body.blocked.down = true;
        if body.velocity.y > 0.0 {
            body.velocity.y = -rebound_speed(body.velocity.y, body.bounce_y, rest_speed);
        }
    }
}

fn rebound_speed(impact_speed: f32, bounce: f32, rest_speed: f32) -> f32 {
    let rebound = impact_speed.abs() * bounce;
    if rebound < rest_speed {
        0.0
    } else {
        rebound
    }
}
