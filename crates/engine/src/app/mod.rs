mod input;
mod loop_runner;
mod metrics;
mod physics;
mod rendering;
mod scene;
mod texture;
mod tools;
mod world;

pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use physics::{ArcadePhysics, Blocked, Body, BodyDesc, BodyKind, PhysicsConfig};
pub use rendering::{Renderer, Viewport};
pub use scene::{
    EntityId, InputSnapshot, Rect, Scene, SceneCommand, SceneKey, SceneMachine, SceneParams,
    SceneSet, Vec2,
};
pub use texture::{Rgba, Texture, TextureCanvas, TextureRegistry};
pub use world::{Entity, RenderableDesc, RenderableKind, SceneWorld, TextAnchor};
