use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::info;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::constants::{ANONYMOUS_USER, NOBODY_GID, NOBODY_UID};

/// One control connection from a client.
///
/// The data stream and listener fields are populated by PASV/EPSV/PORT and
/// cleared again after every transfer, so "no data channel yet" is an
/// ordinary state rather than an error.
#[derive(Debug)]
pub struct Session {
    pub client_ip: IpAddr,
    pub client_port: u16,
    pub ctrl_writer: Arc<Mutex<OwnedWriteHalf>>,
    pub data_stream: Option<Arc<Mutex<TcpStream>>>,
    /// Accept task for a pending passive listener.
    pub data_listener: Option<JoinHandle<()>>,
    /// The command loop driving this session, used for forced teardown.
    pub control_task: Option<JoinHandle<()>>,
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    pub home_dir: String,
    /// Always a normalized absolute path.
    pub current_dir: String,
    pub rename_from: Option<String>,
    pub login_time: DateTime<Utc>,
    pub last_activity: Instant,
}

impl Session {
    pub fn new(client_ip: IpAddr, client_port: u16, ctrl_writer: Arc<Mutex<OwnedWriteHalf>>) -> Self {
        Self {
            client_ip,
            client_port,
            ctrl_writer,
            data_stream: None,
            data_listener: None,
            control_task: None,
            username: String::from(ANONYMOUS_USER),
            uid: NOBODY_UID,
            gid: NOBODY_GID,
            home_dir: String::from("/"),
            current_dir: String::from("/"),
            rename_from: None,
            login_time: Utc::now(),
            last_activity: Instant::now(),
        }
    }

    /// Records command activity for the idle watchdog.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_duration(&self) -> std::time::Duration {
        self.last_activity.elapsed()
    }

    /// Closes and clears the data stream and any pending passive listener.
    /// Safe to call when no data channel is open.
    pub async fn close_data_connection(&mut self) {
        if let Some(stream) = self.data_stream.take() {
            let mut stream = stream.lock().await;
            let _ = stream.shutdown().await;
        }
        if let Some(listener) = self.data_listener.take() {
            listener.abort();
        }
    }
}

/// Insertion-ordered collection of live sessions.
///
/// Lookups return every match so callers can detect ambiguity, e.g. the
/// passive-mode accept path refusing to guess between two sessions that
/// share a client address.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Arc<Mutex<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn register(&mut self, session: Arc<Mutex<Session>>) {
        self.sessions.push(session);
    }

    pub fn deregister(&mut self, session: &Arc<Mutex<Session>>) {
        self.sessions.retain(|s| !Arc::ptr_eq(s, session));
    }

    pub fn sessions(&self) -> &[Arc<Mutex<Session>>] {
        &self.sessions
    }

    pub async fn find_by_ip(&self, ip: IpAddr) -> Vec<Arc<Mutex<Session>>> {
        let mut matches = Vec::new();
        for session in &self.sessions {
            if session.lock().await.client_ip == ip {
                matches.push(Arc::clone(session));
            }
        }
        matches
    }

    pub async fn find_by_username(&self, username: &str) -> Vec<Arc<Mutex<Session>>> {
        let mut matches = Vec::new();
        for session in &self.sessions {
            if session.lock().await.username == username {
                matches.push(Arc::clone(session));
            }
        }
        matches
    }
}

/// Forced teardown used by the idle watchdog and SITE KICK. Sends a final
/// message on the control channel, closes both channels, stops the command
/// loop, and removes the session from the registry.
pub async fn evict_session(
    registry: &Mutex<SessionRegistry>,
    session: &Arc<Mutex<Session>>,
    message: &[u8],
) {
    let (ctrl_writer, client_ip, username) = {
        let session = session.lock().await;
        (
            Arc::clone(&session.ctrl_writer),
            session.client_ip,
            session.username.clone(),
        )
    };

    {
        let mut writer = ctrl_writer.lock().await;
        let _ = writer.write_all(message).await;
        let _ = writer.flush().await;
        let _ = writer.shutdown().await;
    }

    {
        let mut session = session.lock().await;
        session.close_data_connection().await;
        if let Some(task) = session.control_task.take() {
            task.abort();
        }
    }

    registry.lock().await.deregister(session);
    info!("Evicted session for {} ({})", username, client_ip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::{TcpListener, TcpStream};

    async fn test_session(ip: [u8; 4], port: u16) -> Arc<Mutex<Session>> {
        // A connected socket pair gives the session a real control writer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let _server_side = listener.accept().await.unwrap();
        let (_read_half, write_half) = client.into_split();
        Arc::new(Mutex::new(Session::new(
            IpAddr::V4(Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3])),
            port,
            Arc::new(Mutex::new(write_half)),
        )))
    }

    #[tokio::test]
    async fn new_session_defaults_to_anonymous_identity() {
        let session = test_session([10, 0, 0, 1], 50000).await;
        let session = session.lock().await;
        assert_eq!(session.username, ANONYMOUS_USER);
        assert_eq!(session.uid, NOBODY_UID);
        assert_eq!(session.gid, NOBODY_GID);
        assert_eq!(session.current_dir, "/");
        assert!(session.data_stream.is_none());
    }

    #[tokio::test]
    async fn lookup_by_ip_returns_all_matches() {
        let mut registry = SessionRegistry::new();
        let first = test_session([10, 0, 0, 1], 50000).await;
        let second = test_session([10, 0, 0, 1], 50001).await;
        let other = test_session([10, 0, 0, 2], 50002).await;
        registry.register(Arc::clone(&first));
        registry.register(Arc::clone(&second));
        registry.register(Arc::clone(&other));

        let matches = registry
            .find_by_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
            .await;
        assert_eq!(matches.len(), 2);

        registry.deregister(&first);
        let matches = registry
            .find_by_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
            .await;
        assert_eq!(matches.len(), 1);
        assert!(Arc::ptr_eq(&matches[0], &second));
    }

    #[tokio::test]
    async fn lookup_by_username_matches_logged_in_sessions() {
        let mut registry = SessionRegistry::new();
        let session = test_session([10, 0, 0, 3], 50003).await;
        session.lock().await.username = String::from("felicia");
        registry.register(Arc::clone(&session));

        assert_eq!(registry.find_by_username("felicia").await.len(), 1);
        assert!(registry.find_by_username("bob").await.is_empty());
    }

    #[tokio::test]
    async fn eviction_removes_session_and_closes_channels() {
        let registry = Mutex::new(SessionRegistry::new());
        let session = test_session([10, 0, 0, 4], 50004).await;
        registry.lock().await.register(Arc::clone(&session));

        evict_session(&registry, &session, b"421 Idle timeout.\r\n").await;

        let matches = registry
            .lock()
            .await
            .find_by_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4)))
            .await;
        assert!(matches.is_empty());
        assert!(session.lock().await.data_stream.is_none());
    }

    #[tokio::test]
    async fn close_data_connection_is_idempotent() {
        let session = test_session([10, 0, 0, 5], 50005).await;
        let mut session = session.lock().await;
        session.close_data_connection().await;
        session.close_data_connection().await;
        assert!(session.data_stream.is_none());
        assert!(session.data_listener.is_none());
    }
}
