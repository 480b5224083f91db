use std::{fmt, str::FromStr};

use crate::LinkError;

const MAX_RADIO_CHANNEL: u8 = 125;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRate {
    Kbps250,
    Mbps1,
    Mbps2,
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRate::Kbps250 => write!(f, "250K"),
            DataRate::Mbps1 => write!(f, "1M"),
            DataRate::Mbps2 => write!(f, "2M"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioUri {
    pub dongle: u8,
    pub channel: u8,
    pub rate: DataRate,
    pub address: Option<u64>,
}

/// Address of a vehicle link.
///
/// ```text
/// radio://<dongle>/<channel>/<250K|1M|2M>[/<address>]
/// udp://<host>:<port>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkUri {
    Radio(RadioUri),
    Udp { host: String, port: u16 },
}

impl FromStr for LinkUri {
    type Err = LinkError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| LinkError::invalid_uri(uri, "missing scheme"))?;

        match scheme {
            "radio" => parse_radio(uri, rest).map(LinkUri::Radio),
            "udp" => parse_udp(uri, rest),
            other => Err(LinkError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn parse_radio(uri: &str, rest: &str) -> Result<RadioUri, LinkError> {
    let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(LinkError::invalid_uri(
            uri,
            "expected radio://<dongle>/<channel>/<rate>[/<address>]",
        ));
    }

    let dongle = parts[0]
        .parse::<u8>()
        .map_err(|_| LinkError::invalid_uri(uri, "dongle index is not a number"))?;

    let channel = parts[1]
        .parse::<u8>()
        .map_err(|_| LinkError::invalid_uri(uri, "channel is not a number"))?;
    if channel > MAX_RADIO_CHANNEL {
        return Err(LinkError::invalid_uri(
            uri,
            format!("channel must be in 0..={}", MAX_RADIO_CHANNEL),
        ));
    }

    let rate = match parts[2].to_ascii_uppercase().as_str() {
        "250K" => DataRate::Kbps250,
        "1M" => DataRate::Mbps1,
        "2M" => DataRate::Mbps2,
        _ => return Err(LinkError::invalid_uri(uri, "rate must be 250K, 1M or 2M")),
    };

    let address = match parts.get(3) {
        Some(hex) => {
            if hex.len() != 10 {
                return Err(LinkError::invalid_uri(uri, "address must be 10 hex digits"));
            }
            let address = u64::from_str_radix(hex, 16)
                .map_err(|_| LinkError::invalid_uri(uri, "address is not hexadecimal"))?;
            Some(address)
        }
        None => None,
    };

    Ok(RadioUri {
        dongle,
        channel,
        rate,
        address,
    })
}

fn parse_udp(uri: &str, rest: &str) -> Result<LinkUri, LinkError> {
    let (host, port) = rest
        .trim_end_matches('/')
        .rsplit_once(':')
        .ok_or_else(|| LinkError::invalid_uri(uri, "expected udp://<host>:<port>"))?;
    if host.is_empty() {
        return Err(LinkError::invalid_uri(uri, "missing host"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| LinkError::invalid_uri(uri, "port is not a number"))?;
    Ok(LinkUri::Udp {
        host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
        port,
    })
}

impl fmt::Display for LinkUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkUri::Radio(radio) => {
                write!(f, "radio://{}/{}/{}", radio.dongle, radio.channel, radio.rate)?;
                if let Some(address) = radio.address {
                    write!(f, "/{:010X}", address)?;
                }
                Ok(())
            }
            LinkUri::Udp { host, port } if host.contains(':') => {
                write!(f, "udp://[{}]:{}", host, port)
            }
            LinkUri::Udp { host, port } => write!(f, "udp://{}:{}", host, port),
        }
    }
}
