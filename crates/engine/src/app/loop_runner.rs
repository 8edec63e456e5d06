use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::physics::PhysicsConfig;
use super::rendering::{Renderer, Viewport};
use super::scene::{SceneMachine, SceneSet};
use super::tools::{FrameTimings, OverlayData};
use super::world::SceneWorld;
use super::{InputAction, InputSnapshot, MetricsHandle, SceneKey};

pub const SLOW_FRAME_ENV_VAR: &str = "ARCHIVIST_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub overlay_visible: bool,
    pub physics: PhysicsConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Archivist".to_string(),
            window_width: 1024,
            window_height: 576,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            overlay_visible: false,
            physics: PhysicsConfig::default(),
        }
    }
}

impl LoopConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.window_width.max(1),
            height: self.window_height.max(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scenes: SceneSet) -> Result<(), AppError> {
    run_app_with_metrics(config, scenes, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    scenes: SceneSet,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let viewport = config.viewport();
    let world = SceneWorld::new(viewport, config.physics);
    let mut scenes = SceneMachine::new(scenes, world, SceneKey::Boot);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                viewport.width as f64,
                viewport.height as f64,
            ))
            .with_min_inner_size(LogicalSize::new(
                viewport.width as f64 / 2.0,
                viewport.height as f64 / 2.0,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), viewport).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let timing = LoopTiming::from_config(&config, env::var(SLOW_FRAME_ENV_VAR));
    let fixed_dt_seconds = timing.fixed_dt.as_secs_f32();
    let slow_frame_delay = timing.slow_frame_delay;

    info!(
        target_tps = timing.target_tps,
        width = viewport.width,
        height = viewport.height,
        max_frame_delta_ms = timing.max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = timing.max_ticks_per_frame,
        metrics_log_interval_ms = timing.metrics_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = timing.render_fps_cap.unwrap_or(0),
        gravity_y = config.physics.gravity_y,
        "loop_config"
    );

    scenes.load_active();

    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(timing.metrics_interval);
    let mut frame_timings = FrameTimings::default();
    let mut last_applied_title: Option<String> = None;
    let mut overlay_visible = config.overlay_visible;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; not the FPS cap.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    accumulator = accumulator.saturating_add(timing.clamp_frame(raw_frame_dt));
                    let step_plan =
                        plan_sim_steps(accumulator, timing.fixed_dt, timing.max_ticks_per_frame);
                    let sim_start = Instant::now();
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        scenes.tick(fixed_dt_seconds, &input_snapshot);
                        metrics_accumulator.record_tick();
                    }
                    let sim_duration = sim_start.elapsed();
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        metrics_accumulator.record_sim_clamp();
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame = timing.max_ticks_per_frame,
                            "sim_clamp_triggered"
                        );
                    }

                    let cap_sleep = timing
                        .cap_sleep(Instant::now().saturating_duration_since(last_present_instant));
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let render_start = Instant::now();
                    let overlay = overlay_visible.then(|| OverlayData {
                        metrics: metrics_handle.snapshot(),
                        timings: frame_timings.snapshot(),
                        slow_frame_delay_ms: slow_frame_delay.as_millis() as u64,
                        scene: scenes.active_scene().as_str(),
                        entity_count: scenes.world().entity_count(),
                        scene_lines: scenes.debug_lines_active(),
                    });
                    if let Err(error) = renderer.render_world(scenes.world(), overlay.as_ref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    frame_timings.record_frame(sim_duration, render_start.elapsed());

                    let next_title = scenes.debug_title_active();
                    if next_title != last_applied_title {
                        let title = next_title.as_deref().unwrap_or(config.window_title.as_str());
                        window.set_title(title);
                        last_applied_title = next_title;
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            sim_clamps = snapshot.sim_clamps,
                            entity_count = scenes.world().entity_count(),
                            scene = scenes.active_scene().as_str(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = action_for_key(code) else {
            return;
        };
        self.action_states.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }

    fn release_all(&mut self) {
        for action in ALL_ACTIONS {
            self.action_states.set(action, false);
        }
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        self.action_states.take_pressed(InputAction::ToggleOverlay)
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(self.quit_requested, self.action_states);
        self.action_states.clear_edges();
        snapshot
    }
}

const ALL_ACTIONS: [InputAction; 8] = [
    InputAction::MoveLeft,
    InputAction::MoveRight,
    InputAction::Jump,
    InputAction::Dash,
    InputAction::Interact,
    InputAction::ReturnToHub,
    InputAction::ToggleOverlay,
    InputAction::Quit,
];

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::KeyW | KeyCode::ArrowUp | KeyCode::Space => Some(InputAction::Jump),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(InputAction::Dash),
        KeyCode::KeyE => Some(InputAction::Interact),
        KeyCode::KeyQ => Some(InputAction::ReturnToHub),
        KeyCode::F3 => Some(InputAction::ToggleOverlay),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

/// Loop pacing derived once from `LoopConfig`, with zero values replaced by
/// usable defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LoopTiming {
    target_tps: u32,
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    metrics_interval: Duration,
    render_fps_cap: Option<u32>,
    slow_frame_delay: Duration,
}

impl LoopTiming {
    fn from_config(config: &LoopConfig, slow_frame_env: Result<String, env::VarError>) -> Self {
        let target_tps = config.target_tps.max(1);
        let or_default = |value: Duration, default: Duration| {
            if value.is_zero() {
                default
            } else {
                value
            }
        };
        Self {
            target_tps,
            fixed_dt: Duration::from_secs_f64(1.0 / f64::from(target_tps)),
            max_frame_delta: or_default(config.max_frame_delta, Duration::from_millis(250)),
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            metrics_interval: or_default(config.metrics_log_interval, Duration::from_secs(1)),
            render_fps_cap: config.max_render_fps.filter(|fps| *fps > 0),
            slow_frame_delay: slow_frame_delay_from_env(
                slow_frame_env,
                config.simulated_slow_frame_ms,
            ),
        }
    }

    fn clamp_frame(&self, raw_frame_dt: Duration) -> Duration {
        raw_frame_dt.min(self.max_frame_delta)
    }

    /// Remaining time before the next present is allowed; zero when uncapped.
    fn cap_sleep(&self, since_last_present: Duration) -> Duration {
        self.render_fps_cap
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)))
            .map_or(Duration::ZERO, |target| {
                target.saturating_sub(since_last_present)
            })
    }
}

fn slow_frame_delay_from_env(
    env_value: Result<String, env::VarError>,
    config_ms: u64,
) -> Duration {
    let parsed = match env_value {
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, error = %err, "slow_frame_env_unreadable");
            None
        }
        Ok(raw) => {
            let value = raw.trim().parse::<u64>().ok();
            if value.is_none() {
                warn!(env_var = SLOW_FRAME_ENV_VAR, value = raw.as_str(), "slow_frame_env_invalid");
            }
            value
        }
    };
    Duration::from_millis(parsed.unwrap_or(config_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), true);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), false);
    }

    fn timing(config: &LoopConfig) -> LoopTiming {
        LoopTiming::from_config(config, Err(env::VarError::NotPresent))
    }

    #[test]
    fn frame_delta_is_clamped_to_configured_max() {
        let timing = timing(&LoopConfig::default());
        assert_eq!(
            timing.clamp_frame(Duration::from_millis(600)),
            Duration::from_millis(250)
        );
        assert_eq!(
            timing.clamp_frame(Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn zero_config_values_fall_back_to_usable_timing() {
        let timing = timing(&LoopConfig {
            target_tps: 0,
            max_frame_delta: Duration::ZERO,
            max_ticks_per_frame: 0,
            metrics_log_interval: Duration::ZERO,
            max_render_fps: Some(0),
            ..LoopConfig::default()
        });

        assert_eq!(timing.target_tps, 1);
        assert_eq!(timing.fixed_dt, Duration::from_secs(1));
        assert_eq!(timing.max_frame_delta, Duration::from_millis(250));
        assert_eq!(timing.max_ticks_per_frame, 1);
        assert_eq!(timing.metrics_interval, Duration::from_secs(1));
        assert_eq!(timing.render_fps_cap, None);
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let result = plan_sim_steps(Duration::from_millis(50), Duration::from_millis(16), 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn movement_keys_and_arrows_map_to_same_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::ArrowLeft);
        press(&mut input, KeyCode::KeyD);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(!snapshot.is_down(InputAction::Jump));
    }

    #[test]
    fn every_jump_binding_raises_jump_edge() {
        for code in [KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space] {
            let mut input = InputCollector::default();
            press(&mut input, code);
            assert!(input.snapshot_for_tick().just_pressed(InputAction::Jump));
        }
    }

    #[test]
    fn jump_edge_is_consumed_by_first_tick() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.just_pressed(InputAction::Jump));
        assert!(!second.just_pressed(InputAction::Jump));
        assert!(second.is_down(InputAction::Jump));
    }

    #[test]
    fn held_key_repeat_does_not_retrigger_edge() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::ShiftLeft);
        assert!(input.snapshot_for_tick().just_pressed(InputAction::Dash));

        press(&mut input, KeyCode::ShiftLeft);
        assert!(!input.snapshot_for_tick().just_pressed(InputAction::Dash));

        release(&mut input, KeyCode::ShiftLeft);
        press(&mut input, KeyCode::ShiftRight);
        assert!(input.snapshot_for_tick().just_pressed(InputAction::Dash));
    }

    #[test]
    fn interact_and_return_keys_map_to_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyE);
        press(&mut input, KeyCode::KeyQ);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.just_pressed(InputAction::Interact));
        assert!(snapshot.just_pressed(InputAction::ReturnToHub));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);

        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn f3_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();

        press(&mut input, KeyCode::F3);
        assert!(input.take_overlay_toggle_pressed());

        press(&mut input, KeyCode::F3);
        assert!(!input.take_overlay_toggle_pressed());

        release(&mut input, KeyCode::F3);
        press(&mut input, KeyCode::F3);
        assert!(input.take_overlay_toggle_pressed());
    }

    #[test]
    fn focus_loss_releases_held_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        input.release_all();

        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyZ);
        input.update_action_state_from_physical_key(
            PhysicalKey::Unidentified(winit::keyboard::NativeKeyCode::Unidentified),
            true,
        );

        let snapshot = input.snapshot_for_tick();
        assert!(ALL_ACTIONS
            .iter()
            .all(|action| !snapshot.is_down(*action) && !snapshot.just_pressed(*action)));
    }

    #[test]
    fn slow_frame_env_value_overrides_config() {
        assert_eq!(
            slow_frame_delay_from_env(Ok(" 40 ".to_string()), 0),
            Duration::from_millis(40)
        );
        assert_eq!(
            slow_frame_delay_from_env(Ok("soon".to_string()), 7),
            Duration::from_millis(7)
        );
        assert_eq!(
            slow_frame_delay_from_env(Err(env::VarError::NotPresent), 3),
            Duration::from_millis(3)
        );
    }

    #[test]
    fn render_cap_sleeps_only_when_capped_and_early() {
        let uncapped = timing(&LoopConfig::default());
        assert_eq!(uncapped.cap_sleep(Duration::ZERO), Duration::ZERO);

        let capped = timing(&LoopConfig {
            max_render_fps: Some(50),
            ..LoopConfig::default()
        });
        assert_eq!(capped.cap_sleep(Duration::from_millis(25)), Duration::ZERO);
        assert_eq!(
            capped.cap_sleep(Duration::from_millis(5)),
            Duration::from_millis(15)
        );
    }

    #[test]
    fn default_config_uses_logical_platformer_resolution() {
        let config = LoopConfig::default();
        assert_eq!(
            config.viewport(),
            Viewport {
                width: 1024,
                height: 576
            }
        );
        assert_eq!(config.physics, PhysicsConfig::default());
        assert!(!config.overlay_visible);
    }
}
