use std::time::Duration;

use serde::Deserialize;

use crate::config::LandingConfig;

/// Hold a level attitude at `thrust` for `repeats` frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSegment {
    pub label: String,
    pub thrust: u16,
    pub repeats: u32,
    pub interval_ms: u64,
}

impl ProfileSegment {
    pub fn new(label: &str, thrust: u16, repeats: u32, interval_ms: u64) -> Self {
        ProfileSegment {
            label: label.to_string(),
            thrust,
            repeats,
            interval_ms,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn duration(&self) -> Duration {
        self.interval() * self.repeats
    }
}

/// Fixed thrust schedule flown in place of manual control.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlightProfile {
    pub segments: Vec<ProfileSegment>,
    /// Overrides the controller landing ramp after the last segment.
    pub landing: Option<LandingConfig>,
}

impl Default for FlightProfile {
    fn default() -> Self {
        FlightProfile {
            segments: vec![
                ProfileSegment::new("Taking off to moderate altitude...", 37500, 250, 10),
                ProfileSegment::new("Hovering at altitude...", 36000, 200, 10),
            ],
            landing: Some(LandingConfig {
                step: 500,
                interval_ms: 50,
            }),
        }
    }
}

impl FlightProfile {
    pub fn duration(&self) -> Duration {
        self.segments.iter().map(ProfileSegment::duration).sum()
    }

    pub fn peak_thrust(&self) -> Option<u16> {
        self.segments.iter().map(|segment| segment.thrust).max()
    }
}
