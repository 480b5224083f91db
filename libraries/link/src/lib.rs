mod crtp;
mod error;
mod udp;
mod uri;

pub use crtp::Packet;
pub use error::LinkError;
pub use udp::UdpLink;
pub use uri::{DataRate, LinkUri, RadioUri};

/// An open, ordered channel to the vehicle.
///
/// Every call is fire-and-forget: frames are not acknowledged and a returned
/// error only means this frame was not handed to the transport.
pub trait Link {
    fn send_setpoint(&mut self, roll: f32, pitch: f32, yaw: f32, thrust: u16)
        -> Result<(), LinkError>;

    /// Release motor control. Distinct from a zero-thrust setpoint.
    fn send_stop_setpoint(&mut self) -> Result<(), LinkError>;

    fn send_arming_request(&mut self, enable: bool) -> Result<(), LinkError>;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send_setpoint(&mut self, roll: f32, pitch: f32, yaw: f32, thrust: u16) -> Result<(), LinkError> {
        (**self).send_setpoint(roll, pitch, yaw, thrust)
    }

    fn send_stop_setpoint(&mut self) -> Result<(), LinkError> {
        (**self).send_stop_setpoint()
    }

    fn send_arming_request(&mut self, enable: bool) -> Result<(), LinkError> {
        (**self).send_arming_request(enable)
    }
}

/// Open a link for `uri`. The handle releases the transport when dropped.
pub fn connect(uri: &str) -> Result<Box<dyn Link + Send>, LinkError> {
    match uri.parse::<LinkUri>()? {
        LinkUri::Udp { host, port } => Ok(Box::new(UdpLink::connect(&host, port)?)),
        radio @ LinkUri::Radio(_) => Err(LinkError::Unavailable(format!(
            "{} (radio dongle driver is not part of this build)",
            radio
        ))),
    }
}
