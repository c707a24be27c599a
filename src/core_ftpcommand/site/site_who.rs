use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_multiline;
use crate::server::ServerState;
use crate::session::Session;

/// SITE WHO: list of currently connected sessions from the registry.
pub async fn handle_site_who_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    let sessions = state.registry.lock().await.sessions().to_vec();

    let mut lines = Vec::with_capacity(sessions.len() + 1);
    for session in &sessions {
        let session = session.lock().await;
        lines.push(format!(
            "{:<16} {:<15} idle {:>5}s  since {}",
            session.username,
            session.client_ip,
            session.idle_duration().as_secs(),
            session.login_time.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    lines.push(String::from("End."));
    send_multiline(&writer, 211, &lines).await?;
    Ok(true)
}
