use std::{iter, thread, time::Duration};

use link::Link;
use log::{info, warn};

use crate::{ControllerConfig, Setpoint, SharedControl, Trim};

/// Monotonic thrust ramp-down followed by a stop command. Not cancellable.
#[derive(Debug, Clone)]
pub struct LandingSequencer {
    step: u16,
    interval: Duration,
    trim: Trim,
}

impl LandingSequencer {
    pub fn new(step: u16, interval: Duration, trim: Trim) -> Self {
        LandingSequencer {
            step: step.max(1),
            interval,
            trim,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.landing.step, config.landing.interval(), config.trim())
    }

    /// Thrust values sent when landing from `from`: one step lower each time, ending at 0.
    pub fn ramp(&self, from: u16) -> impl Iterator<Item = u16> {
        let step = self.step;
        iter::successors(Some(from.saturating_sub(step)), move |&thrust| {
            (thrust > 0).then(|| thrust.saturating_sub(step))
        })
    }

    pub fn land(&self, link: &mut dyn Link, from: u16) {
        info!("Landing from thrust {}...", from);
        for thrust in self.ramp(from) {
            Setpoint::level(thrust).trimmed(self.trim).send(link);
            thread::sleep(self.interval);
        }
        if let Err(err) = link.send_stop_setpoint() {
            warn!("Stop setpoint not sent: {}", err);
        }
        info!("Propellers stopped.");
    }
}

/// Lands the vehicle when dropped, unless it already landed.
///
/// Holds the link for the powered part of a session. The landing starts from the
/// thrust last recorded with [`LandingGuard::set_thrust`] or, once a control state is
/// tracked, from the last thrust the control loop took from that state. Tracking
/// state is closed before landing so no later command can raise the thrust.
pub struct LandingGuard<'a> {
    link: &'a mut dyn Link,
    landing: &'a LandingSequencer,
    thrust: u16,
    state: Option<SharedControl>,
    landed_from: Option<u16>,
}

impl<'a> LandingGuard<'a> {
    pub fn new(link: &'a mut dyn Link, landing: &'a LandingSequencer) -> Self {
        LandingGuard {
            link,
            landing,
            thrust: 0,
            state: None,
            landed_from: None,
        }
    }

    pub fn link(&mut self) -> &mut dyn Link {
        &mut *self.link
    }

    pub fn set_thrust(&mut self, thrust: u16) {
        self.thrust = thrust;
    }

    pub fn track(&mut self, state: SharedControl) {
        self.state = Some(state);
    }

    /// Land now. Returns the thrust the ramp started from.
    pub fn land(mut self) -> u16 {
        self.land_once()
    }

    fn land_once(&mut self) -> u16 {
        if let Some(from) = self.landed_from {
            return from;
        }
        let from = match &self.state {
            Some(state) => state.close().unwrap_or(self.thrust),
            None => self.thrust,
        };
        self.landed_from = Some(from);
        self.landing.land(&mut *self.link, from);
        from
    }
}

impl Drop for LandingGuard<'_> {
    fn drop(&mut self) {
        if self.landed_from.is_none() {
            warn!("Flight aborted, landing");
            self.land_once();
        }
    }
}
