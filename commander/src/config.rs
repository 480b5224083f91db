use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{profile::FlightProfile, setpoint::Trim, state::ThrustLimits, ConfigError};

/// Controller tuning. Every field has a default so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Negative if drifting left, positive if drifting right.
    pub trim_roll: f32,
    /// Negative if drifting backward, positive if drifting forward.
    pub trim_pitch: f32,

    pub base_thrust: u16,
    pub thrust_increment: u16,
    pub min_thrust: u16,
    pub max_thrust: u16,
    pub control_sensitivity: f32,

    pub control_period_ms: u64,
    pub input_poll_ms: u64,
    pub disarm_pause_ms: u64,

    pub arming: ArmingConfig,
    pub spin_up: SpinUpConfig,
    pub landing: LandingConfig,
    pub profile: FlightProfile,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArmingConfig {
    pub repeats: u32,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpinUpConfig {
    pub repeats: u32,
    pub interval_ms: u64,
    /// Defaults to `base_thrust`.
    pub thrust: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LandingConfig {
    pub step: u16,
    pub interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            trim_roll: 0.0,
            trim_pitch: 0.0,
            base_thrust: 10000,
            thrust_increment: 2000,
            min_thrust: 10000,
            max_thrust: 50000,
            control_sensitivity: 5.0,
            control_period_ms: 50, // 20 Hz
            input_poll_ms: 100,
            disarm_pause_ms: 500,
            arming: ArmingConfig::default(),
            spin_up: SpinUpConfig::default(),
            landing: LandingConfig::default(),
            profile: FlightProfile::default(),
        }
    }
}

impl Default for ArmingConfig {
    fn default() -> Self {
        ArmingConfig {
            repeats: 10,
            interval_ms: 50,
        }
    }
}

impl Default for SpinUpConfig {
    fn default() -> Self {
        SpinUpConfig {
            repeats: 50,
            interval_ms: 20,
            thrust: None,
        }
    }
}

impl Default for LandingConfig {
    fn default() -> Self {
        LandingConfig {
            step: 1000,
            interval_ms: 100,
        }
    }
}

impl ControllerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = ron::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_thrust > self.max_thrust {
            return Err(invalid(
                "min_thrust",
                format!("{} is above max_thrust {}", self.min_thrust, self.max_thrust),
            ));
        }
        if !self.limits().contains(self.base_thrust) {
            return Err(invalid(
                "base_thrust",
                format!(
                    "{} is outside [{}, {}]",
                    self.base_thrust, self.min_thrust, self.max_thrust
                ),
            ));
        }
        if self.thrust_increment == 0 {
            return Err(invalid("thrust_increment", "must be positive".to_string()));
        }
        if !self.control_sensitivity.is_finite() || self.control_sensitivity <= 0.0 {
            return Err(invalid(
                "control_sensitivity",
                format!("{} must be a positive number", self.control_sensitivity),
            ));
        }
        if !self.trim_roll.is_finite() {
            return Err(invalid("trim_roll", "must be finite".to_string()));
        }
        if !self.trim_pitch.is_finite() {
            return Err(invalid("trim_pitch", "must be finite".to_string()));
        }
        if self.control_period_ms == 0 {
            return Err(invalid("control_period_ms", "must be positive".to_string()));
        }
        if self.landing.step == 0 {
            return Err(invalid("landing.step", "must be positive".to_string()));
        }
        if matches!(&self.profile.landing, Some(landing) if landing.step == 0) {
            return Err(invalid("profile.landing.step", "must be positive".to_string()));
        }
        if self.spin_up_thrust() > self.max_thrust {
            return Err(invalid(
                "spin_up.thrust",
                format!("{} is above max_thrust {}", self.spin_up_thrust(), self.max_thrust),
            ));
        }
        if let Some(segment) = self
            .profile
            .segments
            .iter()
            .find(|segment| segment.thrust > self.max_thrust)
        {
            return Err(invalid(
                "profile.segments",
                format!(
                    "`{}` thrust {} is above max_thrust {}",
                    segment.label, segment.thrust, self.max_thrust
                ),
            ));
        }
        Ok(())
    }

    pub fn limits(&self) -> ThrustLimits {
        ThrustLimits {
            min: self.min_thrust,
            max: self.max_thrust,
        }
    }

    pub fn trim(&self) -> Trim {
        Trim {
            roll: self.trim_roll,
            pitch: self.trim_pitch,
        }
    }

    pub fn spin_up_thrust(&self) -> u16 {
        self.spin_up.thrust.unwrap_or(self.base_thrust)
    }

    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }

    pub fn input_poll(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }

    pub fn disarm_pause(&self) -> Duration {
        Duration::from_millis(self.disarm_pause_ms)
    }
}

impl ArmingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl SpinUpConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl LandingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
