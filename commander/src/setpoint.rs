use link::Link;
use log::debug;

use crate::ControlState;

/// Fixed offsets compensating for drift, applied to roll and pitch only.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Trim {
    pub roll: f32,
    pub pitch: f32,
}

/// One roll/pitch/yaw/thrust command.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub thrust: u16,
}

impl Setpoint {
    pub fn new(roll: f32, pitch: f32, yaw: f32, thrust: u16) -> Self {
        Setpoint {
            roll,
            pitch,
            yaw,
            thrust,
        }
    }

    /// Level attitude at `thrust`.
    pub fn level(thrust: u16) -> Self {
        Setpoint::new(0.0, 0.0, 0.0, thrust)
    }

    pub fn from_state(state: &ControlState) -> Self {
        Setpoint::new(state.roll, state.pitch, state.yaw, state.thrust)
    }

    pub fn trimmed(self, trim: Trim) -> Self {
        Setpoint {
            roll: self.roll + trim.roll,
            pitch: self.pitch + trim.pitch,
            ..self
        }
    }

    /// Transmit without waiting for the outcome; a dropped frame is replaced by the next one.
    pub fn send(&self, link: &mut dyn Link) {
        if let Err(err) = link.send_setpoint(self.roll, self.pitch, self.yaw, self.thrust) {
            debug!("Setpoint {:?} not sent: {}", self, err);
        }
    }
}
