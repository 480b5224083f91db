use std::{
    io,
    ops::ControlFlow,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use keyboard::{InputError, Key, KeySource};
use log::{debug, info, warn};

use crate::{command::KEY_BINDINGS, Command, ControllerConfig, Interrupt, SharedControl};

/// Turns operator keys into control state changes.
///
/// Runs until the session is no longer active, the exit key is pressed or the input
/// fails. The key source is dropped on the listener thread when it ends, which is where
/// a raw terminal gets restored.
pub struct InputListener<S> {
    source: S,
    state: SharedControl,
    interrupt: Interrupt,
    sensitivity: f32,
    thrust_increment: u16,
    poll: Duration,
}

impl<S: KeySource> InputListener<S> {
    pub fn new(source: S, state: SharedControl, interrupt: Interrupt, config: &ControllerConfig) -> Self {
        InputListener {
            source,
            state,
            interrupt,
            sensitivity: config.control_sensitivity,
            thrust_increment: config.thrust_increment,
            poll: config.input_poll(),
        }
    }

    pub fn run(mut self) {
        for line in KEY_BINDINGS {
            info!("{}", line);
        }
        debug!("Listening on {}", self.source.name());

        while self.state.is_active() {
            match self.source.next_key(self.poll) {
                Ok(Some(key)) => {
                    if self.handle(&key).is_break() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(InputError::Closed) => {
                    warn!("Input closed, exiting");
                    self.state.deactivate();
                    break;
                }
                Err(err) => {
                    warn!("Input failed: {}, exiting", err);
                    self.state.deactivate();
                    break;
                }
            }
        }
        debug!("Input listener stopped");
    }

    pub fn handle(&self, key: &Key) -> ControlFlow<()> {
        let Some(command) = Command::from_key(key) else {
            return ControlFlow::Continue(());
        };

        match command {
            Command::PitchForward => self.state.set_pitch(-self.sensitivity),
            Command::PitchBackward => self.state.set_pitch(self.sensitivity),
            Command::RollLeft => self.state.set_roll(-self.sensitivity),
            Command::RollRight => self.state.set_roll(self.sensitivity),
            Command::ThrustUp => {
                if let Some(thrust) = self.state.increase_thrust(self.thrust_increment) {
                    info!("Thrust: {}", thrust);
                }
            }
            Command::ThrustDown => {
                if let Some(thrust) = self.state.decrease_thrust(self.thrust_increment) {
                    info!("Thrust: {}", thrust);
                }
            }
            Command::EmergencyStop => {
                self.state.emergency_stop();
                warn!("EMERGENCY STOP!");
            }
            Command::Exit => {
                self.state.deactivate();
                info!("Exiting...");
                return ControlFlow::Break(());
            }
            Command::Interrupt => {
                debug!("Ctrl-C from the terminal");
                self.interrupt.trigger();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

impl<S: KeySource + Send + 'static> InputListener<S> {
    pub fn spawn(self) -> io::Result<ListenerHandle> {
        let state = self.state.clone();
        let handle = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || self.run())?;
        Ok(ListenerHandle { handle, state })
    }
}

pub struct ListenerHandle {
    handle: JoinHandle<()>,
    state: SharedControl,
}

impl ListenerHandle {
    /// End the session and give the listener up to `grace` to finish.
    ///
    /// A listener still blocked on input after that is left running detached. Returns
    /// whether the thread was joined.
    pub fn shutdown(self, grace: Duration) -> bool {
        self.state.deactivate();

        let deadline = Instant::now() + grace;
        while !self.handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }

        if !self.handle.is_finished() {
            debug!("Input listener still waiting for input, detaching");
            return false;
        }
        if self.handle.join().is_err() {
            warn!("Input listener panicked");
        }
        true
    }
}
