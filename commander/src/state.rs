use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ControllerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrustLimits {
    pub min: u16,
    pub max: u16,
}

impl ThrustLimits {
    pub fn contains(&self, thrust: u16) -> bool {
        thrust >= self.min && thrust <= self.max
    }

    pub fn clamp(&self, thrust: i32) -> u16 {
        thrust.clamp(self.min as i32, self.max as i32) as u16
    }
}

/// Operator commands as seen by the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub thrust: u16,
    pub active: bool,
}

/// Control state shared between the input listener and the control loop.
///
/// Cloning gives another handle to the same state. Every access takes the lock for a
/// single read or write, so a reader never observes a partially applied update.
/// Increments never exceed the maximum thrust and decrements never go below the
/// minimum; only an emergency stop commands zero. Once the session is deactivated the
/// operator commands are frozen.
#[derive(Debug, Clone)]
pub struct SharedControl {
    inner: Arc<RwLock<Shared>>,
    limits: ThrustLimits,
    sensitivity: f32,
}

#[derive(Debug)]
struct Shared {
    control: ControlState,
    /// Thrust of the last frame handed to the control loop.
    sent_thrust: Option<u16>,
}

impl SharedControl {
    pub fn new(base_thrust: u16, limits: ThrustLimits, sensitivity: f32) -> Self {
        SharedControl {
            inner: Arc::new(RwLock::new(Shared {
                control: ControlState {
                    roll: 0.0,
                    pitch: 0.0,
                    yaw: 0.0,
                    thrust: limits.clamp(base_thrust as i32),
                    active: true,
                },
                sent_thrust: None,
            })),
            limits,
            sensitivity: sensitivity.abs(),
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.base_thrust, config.limits(), config.control_sensitivity)
    }

    pub fn snapshot(&self) -> ControlState {
        self.read().control
    }

    pub fn thrust(&self) -> u16 {
        self.read().control.thrust
    }

    pub fn is_active(&self) -> bool {
        self.read().control.active
    }

    pub fn set_roll(&self, roll: f32) {
        let roll = self.bound_axis(roll);
        self.update(|control| control.roll = roll);
    }

    pub fn set_pitch(&self, pitch: f32) {
        let pitch = self.bound_axis(pitch);
        self.update(|control| control.pitch = pitch);
    }

    pub fn set_yaw(&self, yaw: f32) {
        let yaw = self.bound_axis(yaw);
        self.update(|control| control.yaw = yaw);
    }

    /// Raise thrust by `step`, up to the maximum. Returns the new thrust, or `None`
    /// once the session is no longer active.
    pub fn increase_thrust(&self, step: u16) -> Option<u16> {
        let max = self.limits.max;
        self.update(|control| {
            control.thrust = control.thrust.saturating_add(step).min(max);
            control.thrust
        })
    }

    /// Lower thrust by `step`, down to the minimum. Returns the new thrust, or `None`
    /// once the session is no longer active.
    pub fn decrease_thrust(&self, step: u16) -> Option<u16> {
        let min = self.limits.min;
        self.update(|control| {
            control.thrust = control.thrust.saturating_sub(step).max(min);
            control.thrust
        })
    }

    /// Zero thrust and all axes. The session stays active.
    pub fn emergency_stop(&self) {
        self.update(|control| {
            control.thrust = 0;
            control.roll = 0.0;
            control.pitch = 0.0;
            control.yaw = 0.0;
        });
    }

    pub fn deactivate(&self) {
        self.write().control.active = false;
    }

    /// Deactivate and return the thrust of the last frame taken by the control loop,
    /// if it took any. Commands arriving afterwards are ignored.
    pub fn close(&self) -> Option<u16> {
        let mut shared = self.write();
        shared.control.active = false;
        shared.sent_thrust
    }

    /// Read the state and reset roll, pitch and yaw to neutral in one step.
    ///
    /// Axis commands are pulses: a key has to be pressed again before the next tick to
    /// keep commanding movement. Thrust is left untouched.
    pub fn take_axes(&self) -> ControlState {
        let mut shared = self.write();
        let current = shared.control;
        shared.sent_thrust = Some(current.thrust);
        shared.control.roll = 0.0;
        shared.control.pitch = 0.0;
        shared.control.yaw = 0.0;
        current
    }

    fn update<T>(&self, apply: impl FnOnce(&mut ControlState) -> T) -> Option<T> {
        let mut shared = self.write();
        if !shared.control.active {
            return None;
        }
        Some(apply(&mut shared.control))
    }

    fn bound_axis(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(-self.sensitivity, self.sensitivity)
    }

    // The guarded data is plain values, a panicking writer cannot leave it half updated.
    fn read(&self) -> RwLockReadGuard<'_, Shared> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
