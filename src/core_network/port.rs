use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::{error, info};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_network::data;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Parses the RFC 959 six-octet PORT argument: four address bytes and two
/// port bytes, comma separated.
pub fn parse_port_param(arg: &str) -> Option<(IpAddr, u16)> {
    let parts: Vec<&str> = arg.split(',').collect();
    if parts.len() != 6 {
        return None;
    }
    let octets: Vec<u8> = parts
        .iter()
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    let ip = IpAddr::from([octets[0], octets[1], octets[2], octets[3]]);
    let port = (octets[4] as u16) << 8 | octets[5] as u16;
    Some((ip, port))
}

/// Handles the PORT (active mode) command: connect out to the
/// client-specified endpoint and store the stream on the session.
pub async fn handle_port_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let arg = match param {
        Some(arg) if !arg.is_empty() => arg,
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    let (ip, port) = match parse_port_param(&arg) {
        Some(endpoint) => endpoint,
        None => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    // A fresh negotiation supersedes any pending data channel.
    data::close_data_connection(&session).await;

    let addr = SocketAddr::new(ip, port);
    match TcpStream::connect(addr).await {
        Ok(stream) => {
            info!("Active data connection established to {}", addr);
            session.lock().await.data_stream = Some(Arc::new(Mutex::new(stream)));
            send_response(&writer, b"200 Command okay.\r\n").await?;
        }
        Err(e) => {
            error!("Failed to connect to client at {}: {}", addr, e);
            send_response(&writer, b"425 Can't open data connection.\r\n").await?;
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn parses_a_valid_port_argument() {
        let (ip, port) = parse_port_param("192,168,1,2,7,138").unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)));
        assert_eq!(port, 7 * 256 + 138);
    }

    #[test]
    fn rejects_wrong_arity_and_bad_octets() {
        assert!(parse_port_param("192,168,1,2,7").is_none());
        assert!(parse_port_param("192,168,1,2,7,138,1").is_none());
        assert!(parse_port_param("192,168,1,256,7,138").is_none());
        assert!(parse_port_param("a,b,c,d,e,f").is_none());
        assert!(parse_port_param("").is_none());
    }

    #[test]
    fn port_bytes_combine_high_then_low() {
        let (_, port) = parse_port_param("127,0,0,1,0,21").unwrap();
        assert_eq!(port, 21);
        let (_, port) = parse_port_param("127,0,0,1,255,255").unwrap();
        assert_eq!(port, 65535);
    }
}
