use std::time::{Duration, Instant};

use link::Link;
use log::{debug, info};

use crate::{ControllerConfig, Interrupt, Setpoint, SharedControl, Trim};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The session was deactivated (exit key, closed input or shutdown).
    Deactivated,
    Interrupted,
}

/// Fixed rate manual control: read, trim, send, reset axes, wait for the next tick.
pub struct ControlLoop {
    period: Duration,
    trim: Trim,
}

impl ControlLoop {
    pub fn new(period: Duration, trim: Trim) -> Self {
        ControlLoop { period, trim }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.control_period(), config.trim())
    }

    pub fn run(&self, link: &mut dyn Link, state: &SharedControl, interrupt: &Interrupt) -> LoopExit {
        info!("Starting manual control mode...");
        let mut next_tick = Instant::now();
        let mut ticks: u64 = 0;

        let exit = loop {
            if interrupt.is_triggered() {
                break LoopExit::Interrupted;
            }
            if !state.is_active() {
                break LoopExit::Deactivated;
            }

            self.tick(link, state);
            ticks += 1;

            next_tick += self.period;
            let now = Instant::now();
            if next_tick > now {
                if interrupt.wait_timeout(next_tick - now) {
                    break LoopExit::Interrupted;
                }
            } else {
                // overrun, start counting again from now instead of bursting
                next_tick = now;
            }
        };

        debug!("Control loop ended after {} ticks: {:?}", ticks, exit);
        exit
    }

    /// Send the current command and reset the axes to neutral.
    pub fn tick(&self, link: &mut dyn Link, state: &SharedControl) -> Setpoint {
        let current = state.take_axes();
        let setpoint = Setpoint::from_state(&current).trimmed(self.trim);
        setpoint.send(link);
        setpoint
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{
        state::ThrustLimits,
        testing::{Frame, RecordingLink},
    };

    const TRIM: Trim = Trim {
        roll: 0.25,
        pitch: -0.5,
    };

    fn state() -> SharedControl {
        SharedControl::new(
            10000,
            ThrustLimits {
                min: 10000,
                max: 50000,
            },
            5.0,
        )
    }

    #[test]
    fn test_tick_applies_trim_and_resets_axes() {
        let control = ControlLoop::new(Duration::from_millis(5), TRIM);
        let state = state();
        let mut link = RecordingLink::new();

        state.set_pitch(-5.0);
        state.set_roll(5.0);
        state.increase_thrust(2000);
        let sent = control.tick(&mut link, &state);
        assert_eq!(sent, Setpoint::new(5.25, -5.5, 0.0, 12000));

        // no key pressed since: neutral axes with trim, thrust kept
        let sent = control.tick(&mut link, &state);
        assert_eq!(sent, Setpoint::new(0.25, -0.5, 0.0, 12000));

        assert_eq!(
            link.frames(),
            vec![
                Frame::Setpoint {
                    roll: 5.25,
                    pitch: -5.5,
                    yaw: 0.0,
                    thrust: 12000
                },
                Frame::Setpoint {
                    roll: 0.25,
                    pitch: -0.5,
                    yaw: 0.0,
                    thrust: 12000
                },
            ]
        );
    }

    #[test]
    fn test_emergency_stop_sends_neutral() {
        let control = ControlLoop::new(Duration::from_millis(5), Trim::default());
        let state = state();
        let mut link = RecordingLink::new();
        state.increase_thrust(6000);
        state.emergency_stop();
        assert_eq!(control.tick(&mut link, &state), Setpoint::level(0));
    }

    #[test]
    fn test_rejected_frames_are_tolerated() {
        let control = ControlLoop::new(Duration::from_millis(5), Trim::default());
        let state = state();
        let mut link = RecordingLink::rejecting();
        control.tick(&mut link, &state);
        control.tick(&mut link, &state);
        assert_eq!(link.setpoint_thrusts(), vec![10000, 10000]);
    }

    #[test]
    fn test_exits_within_a_tick_of_deactivation() {
        let period = Duration::from_millis(20);
        let control = ControlLoop::new(period, Trim::default());
        let state = state();
        let loop_state = state.clone();
        let interrupt = Interrupt::new();
        let link = RecordingLink::new();
        let mut loop_link = link.clone();

        let handle = thread::spawn(move || {
            let exit = control.run(&mut loop_link, &loop_state, &interrupt);
            (exit, Instant::now())
        });

        thread::sleep(Duration::from_millis(100));
        let deactivated_at = Instant::now();
        state.deactivate();
        let (exit, ended_at) = handle.join().unwrap();

        assert_eq!(exit, LoopExit::Deactivated);
        assert!(ended_at.duration_since(deactivated_at) < period * 3);
        assert!(link.frames().len() >= 2);
    }

    #[test]
    fn test_interrupt_breaks_the_wait() {
        let control = ControlLoop::new(Duration::from_secs(30), Trim::default());
        let state = state();
        let interrupt = Interrupt::new();
        let trigger = interrupt.clone();
        let mut link = RecordingLink::new();

        let start = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });
        let exit = control.run(&mut link, &state, &interrupt);
        handle.join().unwrap();

        assert_eq!(exit, LoopExit::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(link.frames().len(), 1);
        assert!(state.is_active());
    }

    #[test]
    fn test_inactive_state_sends_nothing() {
        let control = ControlLoop::new(Duration::from_millis(5), Trim::default());
        let state = state();
        state.deactivate();
        let mut link = RecordingLink::new();
        assert_eq!(
            control.run(&mut link, &state, &Interrupt::new()),
            LoopExit::Deactivated
        );
        assert!(link.frames().is_empty());
    }
}
