use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use log::{debug, info};

use crate::{crtp::Packet, Link, LinkError};

/// CRTP over UDP, one packet per datagram. Used with simulated vehicles.
pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpLink {
    pub fn connect(host: &str, port: u16) -> Result<Self, LinkError> {
        let peer = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            LinkError::Unavailable(format!("udp peer {}:{} did not resolve", host, port))
        })?;

        let local: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;

        info!("Link open to udp://{}", peer);
        Ok(UdpLink { socket, peer })
    }

    fn send(&self, packet: Packet) -> Result<(), LinkError> {
        self.socket.send(&packet.to_bytes())?;
        Ok(())
    }
}

impl Link for UdpLink {
    fn send_setpoint(&mut self, roll: f32, pitch: f32, yaw: f32, thrust: u16) -> Result<(), LinkError> {
        self.send(Packet::setpoint_rpyt(roll, pitch, yaw, thrust))
    }

    fn send_stop_setpoint(&mut self) -> Result<(), LinkError> {
        self.send(Packet::stop_setpoint())
    }

    fn send_arming_request(&mut self, enable: bool) -> Result<(), LinkError> {
        self.send(Packet::arming_request(enable))
    }
}

impl Drop for UdpLink {
    fn drop(&mut self) {
        debug!("Link to udp://{} closed", self.peer);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn vehicle() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let vehicle = vehicle();
        let port = vehicle.local_addr().unwrap().port();
        let mut link = UdpLink::connect("127.0.0.1", port).unwrap();

        link.send_arming_request(true).unwrap();
        link.send_setpoint(0.5, 0.0, 0.0, 12000).unwrap();
        link.send_stop_setpoint().unwrap();

        let mut buf = [0u8; 64];
        let len = vehicle.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], &Packet::arming_request(true).to_bytes()[..]);
        let len = vehicle.recv(&mut buf).unwrap();
        assert_eq!(
            &buf[..len],
            &Packet::setpoint_rpyt(0.5, 0.0, 0.0, 12000).to_bytes()[..]
        );
        let len = vehicle.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x7c_u8, 0x00]);
    }

    #[test]
    fn test_peer_is_resolved() {
        let vehicle = vehicle();
        let port = vehicle.local_addr().unwrap().port();
        let link = UdpLink::connect("127.0.0.1", port).unwrap();
        assert_eq!(link.peer.port(), port);
    }
}
