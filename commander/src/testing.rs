use std::{
    sync::{mpsc, Arc, Mutex},
    time::Duration,
};

use keyboard::{InputError, Key, KeySource};
use link::{Link, LinkError};

use crate::ControllerConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Setpoint {
        roll: f32,
        pitch: f32,
        yaw: f32,
        thrust: u16,
    },
    Stop,
    Arming(bool),
}

impl Frame {
    pub fn thrust(&self) -> Option<u16> {
        match self {
            Frame::Setpoint { thrust, .. } => Some(*thrust),
            _ => None,
        }
    }
}

/// Link double that records every frame handed to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingLink {
    frames: Arc<Mutex<Vec<Frame>>>,
    reject_setpoints: bool,
    panic_on_setpoint: Arc<Mutex<Option<usize>>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records setpoints but reports each one as failed.
    pub fn rejecting() -> Self {
        RecordingLink {
            reject_setpoints: true,
            ..Self::default()
        }
    }

    /// Panics once, on the setpoint with the given zero-based index.
    pub fn panicking_at(index: usize) -> Self {
        RecordingLink {
            panic_on_setpoint: Arc::new(Mutex::new(Some(index))),
            ..Self::default()
        }
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn setpoint_thrusts(&self) -> Vec<u16> {
        self.frames().iter().filter_map(Frame::thrust).collect()
    }

    fn push(&self, frame: Frame) -> usize {
        let mut frames = self.frames.lock().unwrap();
        frames.push(frame);
        frames.iter().filter(|f| f.thrust().is_some()).count()
    }
}

impl Link for RecordingLink {
    fn send_setpoint(&mut self, roll: f32, pitch: f32, yaw: f32, thrust: u16) -> Result<(), LinkError> {
        let sent = self.push(Frame::Setpoint {
            roll,
            pitch,
            yaw,
            thrust,
        });

        let panic_now = {
            let mut panic_at = self.panic_on_setpoint.lock().unwrap();
            if *panic_at == Some(sent - 1) {
                *panic_at = None;
                true
            } else {
                false
            }
        };
        if panic_now {
            panic!("link driver failure");
        }

        if self.reject_setpoints {
            return Err(LinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "radio unplugged",
            )));
        }
        Ok(())
    }

    fn send_stop_setpoint(&mut self) -> Result<(), LinkError> {
        self.push(Frame::Stop);
        Ok(())
    }

    fn send_arming_request(&mut self, enable: bool) -> Result<(), LinkError> {
        self.push(Frame::Arming(enable));
        Ok(())
    }
}

/// Key source fed from a channel. Dropping the sender closes the input.
pub struct ChannelKeys {
    keys: mpsc::Receiver<Key>,
}

impl ChannelKeys {
    pub fn new() -> (mpsc::Sender<Key>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, ChannelKeys { keys: rx })
    }
}

impl KeySource for ChannelKeys {
    fn next_key(&mut self, timeout: Duration) -> Result<Option<Key>, InputError> {
        match self.keys.recv_timeout(timeout) {
            Ok(key) => Ok(Some(key)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(InputError::Closed),
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Default tuning with every interval shrunk to a few milliseconds.
pub fn fast_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.control_period_ms = 5;
    config.input_poll_ms = 5;
    config.disarm_pause_ms = 1;
    config.arming.repeats = 2;
    config.arming.interval_ms = 1;
    config.spin_up.repeats = 3;
    config.spin_up.interval_ms = 1;
    config.landing.interval_ms = 1;
    config
}
