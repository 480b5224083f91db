// CRTP packet encoding for the commands a manual commander needs
pub const RPYT_PORT: u8 = 3;
pub const GENERIC_SETPOINT_PORT: u8 = 7;
pub const PLATFORM_PORT: u8 = 13;

const RPYT_CHANNEL: u8 = 0;
const GENERIC_SETPOINT_CHANNEL: u8 = 0;
const PLATFORM_COMMAND_CHANNEL: u8 = 0;

const SETPOINT_TYPE_STOP: u8 = 0;
const PLATFORM_REQUEST_ARMING: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    port: u8,
    channel: u8,
    payload: Vec<u8>,
}

impl Packet {
    pub fn new(port: u8, channel: u8, payload: Vec<u8>) -> Self {
        Packet {
            port,
            channel,
            payload,
        }
    }

    /// Legacy roll/pitch/yaw/thrust setpoint.
    ///
    /// Roll and pitch are absolute angles in degrees, yaw is a rate in degrees per second
    /// and thrust is a 16 bit value where 0 maps to 0% and 65535 to 100%.
    pub fn setpoint_rpyt(roll: f32, pitch: f32, yaw: f32, thrust: u16) -> Self {
        let mut payload = Vec::with_capacity(14);
        payload.extend_from_slice(&roll.to_le_bytes());
        payload.extend_from_slice(&pitch.to_le_bytes());
        payload.extend_from_slice(&yaw.to_le_bytes());
        payload.extend_from_slice(&thrust.to_le_bytes());
        Packet::new(RPYT_PORT, RPYT_CHANNEL, payload)
    }

    /// Stop setpoint: releases motor control instead of commanding zero thrust.
    pub fn stop_setpoint() -> Self {
        Packet::new(
            GENERIC_SETPOINT_PORT,
            GENERIC_SETPOINT_CHANNEL,
            vec![SETPOINT_TYPE_STOP],
        )
    }

    pub fn arming_request(enable: bool) -> Self {
        Packet::new(
            PLATFORM_PORT,
            PLATFORM_COMMAND_CHANNEL,
            vec![PLATFORM_REQUEST_ARMING, enable as u8],
        )
    }

    pub fn header(&self) -> u8 {
        // bits 2-3 are the link bits and must be set
        ((self.port & 0x0f) << 4) | 0x0c | (self.channel & 0x03)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.payload.len() + 1);
        bytes.push(self.header());
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
