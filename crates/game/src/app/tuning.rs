use std::fs;
use std::path::{Path, PathBuf};

use engine::PhysicsConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

use super::gameplay::movement::{DashProfile, MovementProfile};

pub(crate) const TUNING_ENV_VAR: &str = "ARCHIVIST_TUNING";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tuning {
    pub physics: PhysicsConfig,
    pub hub_movement: MovementProfile,
    pub level_movement: MovementProfile,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            hub_movement: MovementProfile::hub(),
            level_movement: MovementProfile::level(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read tuning file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("tuning file {} is invalid at {json_path}: {source}", path.display())]
    Parse {
        path: PathBuf,
        json_path: String,
        source: serde_json::Error,
    },
    #[error("tuning value {field} {reason}")]
    Invalid { field: String, reason: &'static str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TuningFile {
    physics: Option<PhysicsConfig>,
    hub_movement: Option<MovementFile>,
    level_movement: Option<MovementFile>,
}

/// Outer `None` keeps the built-in value; `Some(None)` comes from an explicit
/// `null` and disables the ability.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MovementFile {
    max_speed: Option<f32>,
    jump_velocity: Option<f32>,
    #[serde(deserialize_with = "explicit_null")]
    double_jump_velocity: Option<Option<f32>>,
    #[serde(deserialize_with = "explicit_null")]
    dash: Option<Option<DashProfile>>,
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MovementFile {
    fn apply(self, base: MovementProfile) -> MovementProfile {
        MovementProfile {
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            jump_velocity: self.jump_velocity.unwrap_or(base.jump_velocity),
            double_jump_velocity: self
                .double_jump_velocity
                .unwrap_or(base.double_jump_velocity),
            dash: self.dash.unwrap_or(base.dash),
        }
    }
}

impl Tuning {
    pub(crate) fn load_from_env() -> Result<Self, TuningError> {
        match std::env::var_os(TUNING_ENV_VAR) {
            Some(raw) if !raw.is_empty() => Self::load_from_path(Path::new(&raw)),
            _ => Ok(Self::default()),
        }
    }

    pub(crate) fn load_from_path(path: &Path) -> Result<Self, TuningError> {
        let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::parse(&raw, path)?;
        info!(path = %path.display(), "tuning_loaded");
        Ok(tuning)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, TuningError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: TuningFile =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let json_path = error.path().to_string();
                TuningError::Parse {
                    path: path.to_path_buf(),
                    json_path,
                    source: error.into_inner(),
                }
            })?;

        let defaults = Self::default();
        let tuning = Self {
            physics: file.physics.unwrap_or(defaults.physics),
            hub_movement: file
                .hub_movement
                .map_or(defaults.hub_movement, |m| m.apply(defaults.hub_movement)),
            level_movement: file
                .level_movement
                .map_or(defaults.level_movement, |m| m.apply(defaults.level_movement)),
        };
        tuning.validate()?;
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), TuningError> {
        finite("physics.gravity_y", self.physics.gravity_y)?;
        non_negative("physics.rest_speed", self.physics.rest_speed)?;
        validate_movement("hub_movement", &self.hub_movement)?;
        validate_movement("level_movement", &self.level_movement)
    }
}

fn validate_movement(section: &str, profile: &MovementProfile) -> Result<(), TuningError> {
    let field = |name: &str| format!("{section}.{name}");
    non_negative(&field("max_speed"), profile.max_speed)?;
    non_negative(&field("jump_velocity"), profile.jump_velocity)?;
    if let Some(velocity) = profile.double_jump_velocity {
        non_negative(&field("double_jump_velocity"), velocity)?;
    }
    if let Some(dash) = profile.dash {
        non_negative(&field("dash.speed"), dash.speed)?;
        positive(&field("dash.duration_ms"), dash.duration_ms)?;
        positive(&field("dash.cooldown_ms"), dash.cooldown_ms)?;
    }
    Ok(())
}

fn invalid(field: &str, reason: &'static str) -> TuningError {
    TuningError::Invalid {
        field: field.to_string(),
        reason,
    }
}

fn finite(field: &str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be finite"))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), TuningError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, "must not be negative"));
    }
    Ok(())
}

fn positive(field: &str, value: f32) -> Result<(), TuningError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, "must be positive"));
    }
    Ok(())
}
