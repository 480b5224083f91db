use std::{thread, time::Duration};

use keyboard::KeySource;
use link::Link;
use log::{debug, info, warn};

use crate::{
    CommanderError, ControlLoop, ControllerConfig, FlightProfile, InputListener, Interrupt,
    LandingGuard, LandingSequencer, LoopExit, Setpoint, SharedControl,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Idle,
    Arming,
    SpinUp,
    ManualControl,
    ScriptedFlight,
    Landing,
    Disarmed,
}

/// Who commands the vehicle once the motors are spinning.
pub enum Pilot {
    Manual(Box<dyn KeySource + Send>),
    Scripted(FlightProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The scripted profile ran to its end.
    Completed,
    /// Exit key, or the operator input went away.
    OperatorExit,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub phases: Vec<FlightPhase>,
    pub exit: SessionExit,
    /// Thrust the landing ramp started from, if the motors were started.
    pub landing_from: Option<u16>,
}

/// Drives a session: arm, spin up, fly, land, disarm.
///
/// Every phase is a fixed sequence of unacknowledged frames. Once armed the vehicle is
/// always disarmed, and once spinning it always lands, whether the session ends
/// normally, on an interrupt or by a panic unwinding through `run`.
pub struct Sequencer {
    config: ControllerConfig,
    interrupt: Interrupt,
    phases: Vec<FlightPhase>,
}

impl Sequencer {
    pub fn new(config: ControllerConfig, interrupt: Interrupt) -> Result<Self, CommanderError> {
        config.validate()?;
        Ok(Sequencer {
            config,
            interrupt,
            phases: vec![FlightPhase::Idle],
        })
    }

    pub fn phase(&self) -> FlightPhase {
        self.phases.last().copied().unwrap_or(FlightPhase::Idle)
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn run(&mut self, link: &mut dyn Link, pilot: Pilot) -> Result<SessionReport, CommanderError> {
        self.phases = vec![FlightPhase::Idle];
        let landing = self.landing_for(&pilot);
        let mut armed = ArmedGuard::new(link, self.config.disarm_pause());

        self.enter(FlightPhase::Arming);
        let (outcome, landing_from) = if self.arm(armed.link()) {
            let mut guard = LandingGuard::new(armed.link(), &landing);
            self.enter(FlightPhase::SpinUp);
            let outcome = if self.spin_up(&mut guard) {
                self.fly(&mut guard, pilot)
            } else {
                Ok(SessionExit::Interrupted)
            };
            self.enter(FlightPhase::Landing);
            (outcome, Some(guard.land()))
        } else {
            (Ok(SessionExit::Interrupted), None)
        };

        self.enter(FlightPhase::Disarmed);
        armed.disarm();

        let exit = outcome?;
        info!("Session ended: {:?}", exit);
        Ok(SessionReport {
            phases: self.phases.clone(),
            exit,
            landing_from,
        })
    }

    fn enter(&mut self, phase: FlightPhase) {
        debug!("{:?} -> {:?}", self.phase(), phase);
        self.phases.push(phase);
    }

    fn landing_for(&self, pilot: &Pilot) -> LandingSequencer {
        match pilot {
            Pilot::Scripted(FlightProfile {
                landing: Some(landing),
                ..
            }) => LandingSequencer::new(landing.step, landing.interval(), self.config.trim()),
            _ => LandingSequencer::from_config(&self.config),
        }
    }

    /// Returns false if interrupted before arming completed.
    fn arm(&self, link: &mut dyn Link) -> bool {
        info!("Arming motors...");
        for _ in 0..self.config.arming.repeats {
            if self.interrupt.is_triggered() {
                return false;
            }
            if let Err(err) = link.send_arming_request(true) {
                debug!("Arming request not sent: {}", err);
            }
            Setpoint::level(0).send(link);
            if self.interrupt.wait_timeout(self.config.arming.interval()) {
                return false;
            }
        }
        !self.interrupt.is_triggered()
    }

    /// Bring the motors to a stable minimum before anyone else commands thrust.
    fn spin_up(&self, guard: &mut LandingGuard<'_>) -> bool {
        info!("Starting propellers...");
        let setpoint = Setpoint::level(self.config.spin_up_thrust()).trimmed(self.config.trim());
        self.hold(guard, setpoint, self.config.spin_up.repeats, self.config.spin_up.interval())
    }

    fn fly(&mut self, guard: &mut LandingGuard<'_>, pilot: Pilot) -> Result<SessionExit, CommanderError> {
        match pilot {
            Pilot::Manual(keys) => {
                self.enter(FlightPhase::ManualControl);
                self.fly_manual(guard, keys)
            }
            Pilot::Scripted(profile) => {
                self.enter(FlightPhase::ScriptedFlight);
                Ok(self.fly_profile(guard, &profile))
            }
        }
    }

    fn fly_manual(
        &self,
        guard: &mut LandingGuard<'_>,
        keys: Box<dyn KeySource + Send>,
    ) -> Result<SessionExit, CommanderError> {
        let state = SharedControl::from_config(&self.config);
        guard.track(state.clone());

        let listener = InputListener::new(keys, state.clone(), self.interrupt.clone(), &self.config)
            .spawn()
            .map_err(CommanderError::Listener)?;

        let exit = ControlLoop::from_config(&self.config).run(guard.link(), &state, &self.interrupt);
        listener.shutdown(self.config.input_poll() * 2);

        Ok(match exit {
            LoopExit::Deactivated => SessionExit::OperatorExit,
            LoopExit::Interrupted => {
                info!("Keyboard interrupt - landing...");
                SessionExit::Interrupted
            }
        })
    }

    fn fly_profile(&self, guard: &mut LandingGuard<'_>, profile: &FlightProfile) -> SessionExit {
        info!(
            "Flying profile: {} segments over {:.1}s, peak thrust {}",
            profile.segments.len(),
            profile.duration().as_secs_f32(),
            profile.peak_thrust().unwrap_or(0)
        );
        let trim = self.config.trim();
        for segment in &profile.segments {
            info!("{}", segment.label);
            let setpoint = Setpoint::level(segment.thrust).trimmed(trim);
            if !self.hold(guard, setpoint, segment.repeats, segment.interval()) {
                return SessionExit::Interrupted;
            }
        }
        SessionExit::Completed
    }

    /// Send `setpoint` `repeats` times. Returns false if interrupted.
    fn hold(&self, guard: &mut LandingGuard<'_>, setpoint: Setpoint, repeats: u32, interval: Duration) -> bool {
        for _ in 0..repeats {
            if self.interrupt.is_triggered() {
                return false;
            }
            setpoint.send(guard.link());
            guard.set_thrust(setpoint.thrust);
            if self.interrupt.wait_timeout(interval) {
                return false;
            }
        }
        !self.interrupt.is_triggered()
    }
}

/// Disarms the vehicle when dropped, unless already disarmed.
struct ArmedGuard<'a> {
    link: &'a mut dyn Link,
    pause: Duration,
    disarmed: bool,
}

impl<'a> ArmedGuard<'a> {
    fn new(link: &'a mut dyn Link, pause: Duration) -> Self {
        ArmedGuard {
            link,
            pause,
            disarmed: false,
        }
    }

    fn link(&mut self) -> &mut dyn Link {
        &mut *self.link
    }

    fn disarm(mut self) {
        self.disarm_once();
    }

    fn disarm_once(&mut self) {
        if self.disarmed {
            return;
        }
        self.disarmed = true;
        info!("Disarming...");
        if let Err(err) = self.link.send_arming_request(false) {
            warn!("Disarm request not sent: {}", err);
        }
        // give the vehicle time to register the disarm
        thread::sleep(self.pause);
    }
}

impl Drop for ArmedGuard<'_> {
    fn drop(&mut self) {
        if !self.disarmed {
            warn!("Session aborted, disarming");
            self.disarm_once();
        }
    }
}
