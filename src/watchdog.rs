use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::time::interval;

use crate::constants::WATCHDOG_INTERVAL_SECS;
use crate::server::ServerState;
use crate::session::evict_session;

/// Starts the idle-session watchdog: a periodic sweep that evicts any
/// session whose last activity is older than the configured timeout,
/// through the same teardown path as an explicit QUIT.
pub fn start_watchdog(state: Arc<ServerState>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(WATCHDOG_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            sweep_idle_sessions(&state).await;
        }
    });
}

pub async fn sweep_idle_sessions(state: &Arc<ServerState>) {
    let timeout_minutes = state.config.server.idle_timeout_minutes;
    if timeout_minutes == 0 {
        return;
    }
    let timeout = Duration::from_secs(timeout_minutes * 60);

    let sessions = state.registry.lock().await.sessions().to_vec();
    debug!("Watchdog sweep over {} session(s)", sessions.len());
    for session in sessions {
        let (idle, client_ip) = {
            let session = session.lock().await;
            (session.idle_duration(), session.client_ip)
        };
        if idle > timeout {
            info!(
                "Session from {} idle for {}s; evicting",
                client_ip,
                idle.as_secs()
            );
            evict_session(&state.registry, &session, b"421 Idle timeout.\r\n").await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Instant;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::Mutex;

    use crate::config::Config;
    use crate::core_auth::credentials::CredentialStore;
    use crate::core_network::pasv::PortPool;
    use crate::session::{Session, SessionRegistry};

    async fn test_state(idle_timeout_minutes: u64) -> Arc<ServerState> {
        let mut config = Config::default();
        config.server.idle_timeout_minutes = idle_timeout_minutes;
        Arc::new(ServerState {
            config,
            credentials: CredentialStore::load(&[]).unwrap(),
            registry: Mutex::new(SessionRegistry::new()),
            port_pool: Mutex::new(PortPool::new(50000, 50010)),
            start_time: Instant::now(),
        })
    }

    async fn register_session(state: &Arc<ServerState>, ip: IpAddr) -> Arc<Mutex<Session>> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let _server_side = listener.accept().await.unwrap();
        let (_read_half, write_half) = client.into_split();
        let session = Arc::new(Mutex::new(Session::new(
            ip,
            50000,
            Arc::new(Mutex::new(write_half)),
        )));
        state.registry.lock().await.register(Arc::clone(&session));
        session
    }

    #[tokio::test]
    async fn sessions_idle_past_the_threshold_are_evicted() {
        let state = test_state(1).await;
        let ip = IpAddr::V4(Ipv4Addr::new(10, 9, 9, 1));
        let session = register_session(&state, ip).await;
        session.lock().await.last_activity = Instant::now() - Duration::from_secs(61);

        sweep_idle_sessions(&state).await;

        let matches = state.registry.lock().await.find_by_ip(ip).await;
        assert!(matches.is_empty());
        assert!(session.lock().await.data_stream.is_none());
    }

    #[tokio::test]
    async fn active_sessions_survive_the_sweep() {
        let state = test_state(1).await;
        let ip = IpAddr::V4(Ipv4Addr::new(10, 9, 9, 2));
        let session = register_session(&state, ip).await;
        session.lock().await.last_activity = Instant::now() - Duration::from_secs(59);

        sweep_idle_sessions(&state).await;

        assert_eq!(state.registry.lock().await.find_by_ip(ip).await.len(), 1);
    }

    #[tokio::test]
    async fn zero_timeout_disables_the_sweep() {
        let state = test_state(0).await;
        let ip = IpAddr::V4(Ipv4Addr::new(10, 9, 9, 3));
        let session = register_session(&state, ip).await;
        session.lock().await.last_activity = Instant::now() - Duration::from_secs(3600);

        sweep_idle_sessions(&state).await;

        assert_eq!(state.registry.lock().await.find_by_ip(ip).await.len(), 1);
    }
}
