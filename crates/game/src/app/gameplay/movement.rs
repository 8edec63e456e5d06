use serde::Deserialize;

/// Speeds are px/s, durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DashProfile {
    pub speed: f32,
    pub duration_ms: f32,
    pub cooldown_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MovementProfile {
    pub max_speed: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: Option<f32>,
    pub dash: Option<DashProfile>,
}

impl MovementProfile {
    pub(crate) fn level() -> Self {
        Self {
            max_speed: 220.0,
            jump_velocity: 370.0,
            double_jump_velocity: Some(340.0),
            dash: Some(DashProfile {
                speed: 600.0,
                duration_ms: 120.0,
                cooldown_ms: 300.0,
            }),
        }
    }

    pub(crate) fn hub() -> Self {
        Self {
            max_speed: 200.0,
            jump_velocity: 350.0,
            double_jump_velocity: None,
            dash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum DashPhase {
    #[default]
    Idle,
    Dashing {
        remaining_ms: f32,
    },
    Cooldown {
        remaining_ms: f32,
    },
}

impl DashPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            DashPhase::Idle => "idle",
            DashPhase::Dashing { .. } => "dashing",
            DashPhase::Cooldown { .. } => "cooldown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MovementInput {
    pub left: bool,
    pub right: bool,
    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub grounded: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MotionCommand {
    pub velocity_x: Option<f32>,
    pub velocity_y: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Actor {
    facing: Facing,
    double_jump_available: bool,
    dash: DashPhase,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            facing: Facing::Right,
            double_jump_available: true,
            dash: DashPhase::Idle,
        }
    }
}

impl Actor {
    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn double_jump_available(&self) -> bool {
        self.double_jump_available
    }

    pub(crate) fn dash_phase(&self) -> DashPhase {
        self.dash
    }

    pub(crate) fn step(
        &mut self,
        profile: &MovementProfile,
        input: MovementInput,
        dt_seconds: f32,
    ) -> MotionCommand {
        let mut command = MotionCommand::default();
        let dt_ms = dt_seconds.max(0.0) * 1000.0;

        self.advance_dash(profile, dt_ms, &mut command);

        if !matches!(self.dash, DashPhase::Dashing { .. }) {
            command.velocity_x = Some(if input.left {
                self.facing = Facing::Left;
                -profile.max_speed
            } else if input.right {
                self.facing = Facing::Right;
                profile.max_speed
            } else {
                0.0
            });
        }

        if input.jump_pressed {
            if input.grounded {
                command.velocity_y = Some(-profile.jump_velocity);
                self.double_jump_available = true;
            } else if self.double_jump_available {
                if let Some(double_jump_velocity) = profile.double_jump_velocity {
                    command.velocity_y = Some(-double_jump_velocity);
                    self.double_jump_available = false;
                }
            }
        }

        if input.grounded {
            self.double_jump_available = true;
        }

        if input.dash_pressed && self.dash == DashPhase::Idle {
            if let Some(dash) = profile.dash {
                command.velocity_x = Some(dash.speed * self.facing.sign());
                self.dash = DashPhase::Dashing {
                    remaining_ms: dash.duration_ms,
                };
            }
        }

        command
    }

    fn advance_dash(
        &mut self,
        profile: &MovementProfile,
        dt_ms: f32,
        command: &mut MotionCommand,
    ) {
        self.dash = match self.dash {
            DashPhase::Idle => DashPhase::Idle,
            DashPhase::Dashing { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms > 0.0 {
                    DashPhase::Dashing { remaining_ms }
                } else {
                    command.velocity_x = Some(0.0);
                    DashPhase::Cooldown {
                        remaining_ms: profile.dash.map_or(0.0, |dash| dash.cooldown_ms),
                    }
                }
            }
            DashPhase::Cooldown { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms > 0.0 {
                    DashPhase::Cooldown { remaining_ms }
                } else {
                    DashPhase::Idle
                }
            }
        };
    }
}
