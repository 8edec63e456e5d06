pub mod app;

pub use app::{
    run_app, run_app_with_metrics, AppError, ArcadePhysics, Blocked, Body, BodyDesc, BodyKind,
    Entity, EntityId, InputAction, InputSnapshot, LoopConfig, LoopMetricsSnapshot, MetricsHandle,
    PhysicsConfig, Rect, RenderableDesc, RenderableKind, Renderer, Rgba, Scene, SceneCommand,
    SceneKey, SceneMachine, SceneParams, SceneSet, SceneWorld, TextAnchor, Texture,
    TextureCanvas, TextureRegistry, Vec2, Viewport, SLOW_FRAME_ENV_VAR,
};
