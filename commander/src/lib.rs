mod command;
mod config;
mod control_loop;
mod error;
mod interrupt;
mod landing;
mod listener;
mod profile;
mod sequencer;
mod setpoint;
mod state;

#[cfg(test)]
mod testing;

pub use command::{Command, KEY_BINDINGS};
pub use config::{ArmingConfig, ControllerConfig, LandingConfig, SpinUpConfig};
pub use control_loop::{ControlLoop, LoopExit};
pub use error::{CommanderError, ConfigError};
pub use interrupt::Interrupt;
pub use landing::{LandingGuard, LandingSequencer};
pub use listener::{InputListener, ListenerHandle};
pub use profile::{FlightProfile, ProfileSegment};
pub use sequencer::{FlightPhase, Pilot, Sequencer, SessionExit, SessionReport};
pub use setpoint::{Setpoint, Trim};
pub use state::{ControlState, SharedControl, ThrustLimits};
