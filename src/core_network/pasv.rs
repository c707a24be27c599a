use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::core_network::data;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::{Session, SessionRegistry};

/// Rotating pool of candidate ports for passive listeners.
///
/// Allocation pops the front and appends it to the back, so a port is not
/// reissued until every other entry has been issued once. That spacing
/// keeps freshly closed listeners out of the OS TIME_WAIT collisions.
#[derive(Debug)]
pub struct PortPool {
    ports: VecDeque<u16>,
}

impl PortPool {
    pub fn new(start: u16, end: u16) -> Self {
        Self {
            ports: (start..=end).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn acquire(&mut self) -> Option<u16> {
        let port = self.ports.pop_front()?;
        self.ports.push_back(port);
        Some(port)
    }
}

/// Associates an inbound data connection with the session it belongs to,
/// by matching the peer address against the registry. Zero or multiple
/// matches mean the connection cannot be attributed safely and it is
/// dropped. Two sessions behind one NAT address are not disambiguated;
/// the duplicate-address check at accept time keeps that from arising.
pub async fn match_data_connection(
    registry: &Mutex<SessionRegistry>,
    peer_ip: IpAddr,
    stream: TcpStream,
) -> bool {
    let matches = {
        let registry = registry.lock().await;
        registry.find_by_ip(peer_ip).await
    };
    match matches.len() {
        1 => {
            matches[0].lock().await.data_stream = Some(Arc::new(Mutex::new(stream)));
            debug!("Data connection from {} attached to its session", peer_ip);
            true
        }
        0 => {
            error!("Data connection from {} matches no session; dropping", peer_ip);
            false
        }
        n => {
            error!(
                "Data connection from {} matches {} sessions; dropping",
                peer_ip, n
            );
            false
        }
    }
}

/// Starts a passive listener and spawns its accept task. Returns the port
/// the listener is bound to, or None when no listener could be started.
async fn start_pasv_listener(
    state: &Arc<ServerState>,
    session: &Arc<Mutex<Session>>,
) -> Option<u16> {
    // A fresh negotiation supersedes any pending data channel.
    data::close_data_connection(session).await;

    let listen_ip: IpAddr = match state.config.server.listen_address.parse() {
        Ok(ip) => ip,
        Err(e) => {
            error!("Invalid listen address for passive listener: {}", e);
            return None;
        }
    };
    let port = state.port_pool.lock().await.acquire()?;
    let listener = match TcpListener::bind((listen_ip, port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind passive listener on port {}: {}", port, e);
            return None;
        }
    };
    debug!("Passive listener bound on {}:{}", listen_ip, port);

    let accept_state = Arc::clone(state);
    let handle = tokio::spawn(async move {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if match_data_connection(&accept_state.registry, peer.ip(), stream).await {
                    info!("Passive data connection established from {}", peer);
                }
            }
            Err(e) => {
                error!("Failed to accept passive data connection: {}", e);
            }
        }
    });
    session.lock().await.data_listener = Some(handle);

    Some(port)
}

/// Handles the PASV command: allocate a pool port, start the listener,
/// and report the advertised address in the dotted-quad, two-byte-port
/// encoding.
pub async fn handle_pasv_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let pasv_ip: Ipv4Addr = match state.config.server.pasv_address.parse() {
        Ok(ip) => ip,
        Err(e) => {
            error!("Invalid pasv_address in configuration: {}", e);
            send_response(&writer, b"425 Can't open data connection.\r\n").await?;
            return Ok(true);
        }
    };

    let port = match start_pasv_listener(&state, &session).await {
        Some(port) => port,
        None => {
            send_response(&writer, b"425 Can't open data connection.\r\n").await?;
            return Ok(true);
        }
    };

    let [a, b, c, d] = pasv_ip.octets();
    let response = format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
        a,
        b,
        c,
        d,
        port / 256,
        port % 256
    );
    send_response(&writer, response.as_bytes()).await?;
    Ok(true)
}

/// Handles the EPSV command: same negotiation as PASV, modern
/// single-port reply form.
pub async fn handle_epsv_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let port = match start_pasv_listener(&state, &session).await {
        Some(port) => port,
        None => {
            send_response(&writer, b"425 Can't open data connection.\r\n").await?;
            return Ok(true);
        }
    };

    let response = format!("229 Entering Extended Passive Mode (|||{}|).\r\n", port);
    send_response(&writer, response.as_bytes()).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[test]
    fn pool_rotates_through_every_port_before_reissuing() {
        let mut pool = PortPool::new(50000, 50004);
        let first_cycle: Vec<u16> = (0..5).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(first_cycle, vec![50000, 50001, 50002, 50003, 50004]);

        // The second cycle repeats the sequence exactly.
        let second_cycle: Vec<u16> = (0..5).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(first_cycle, second_cycle);
    }

    #[test]
    fn no_port_repeats_within_a_window_smaller_than_the_pool() {
        let mut pool = PortPool::new(50000, 50009);
        let issued: Vec<u16> = (0..50).map(|_| pool.acquire().unwrap()).collect();
        for window in issued.windows(10) {
            let mut seen = window.to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 10);
        }
    }

    #[test]
    fn single_port_pool_keeps_issuing_that_port() {
        let mut pool = PortPool::new(50000, 50000);
        assert_eq!(pool.acquire(), Some(50000));
        assert_eq!(pool.acquire(), Some(50000));
        assert_eq!(pool.len(), 1);
    }

    async fn connected_stream() -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let _ = listener.accept().await.unwrap();
        client
    }

    async fn registered_session(
        registry: &Mutex<SessionRegistry>,
        ip: IpAddr,
    ) -> Arc<Mutex<Session>> {
        let stream = connected_stream().await;
        let (_read_half, write_half) = stream.into_split();
        let session = Arc::new(Mutex::new(Session::new(
            ip,
            50000,
            Arc::new(Mutex::new(write_half)),
        )));
        registry.lock().await.register(Arc::clone(&session));
        session
    }

    #[tokio::test]
    async fn inbound_connection_attaches_to_the_single_matching_session() {
        let registry = Mutex::new(SessionRegistry::new());
        let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1));
        let session = registered_session(&registry, ip).await;

        let stream = connected_stream().await;
        assert!(match_data_connection(&registry, ip, stream).await);
        assert!(session.lock().await.data_stream.is_some());
    }

    #[tokio::test]
    async fn unmatched_and_ambiguous_connections_are_dropped() {
        let registry = Mutex::new(SessionRegistry::new());
        let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 1, 2));

        let stream = connected_stream().await;
        assert!(!match_data_connection(&registry, ip, stream).await);

        let first = registered_session(&registry, ip).await;
        let second = registered_session(&registry, ip).await;
        let stream = connected_stream().await;
        assert!(!match_data_connection(&registry, ip, stream).await);
        assert!(first.lock().await.data_stream.is_none());
        assert!(second.lock().await.data_stream.is_none());
    }
}
