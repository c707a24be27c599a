use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Snapshot of the session fields every path-handling command needs:
/// working directory, home directory, uid, gid.
pub async fn path_context(session: &Arc<Mutex<Session>>) -> (String, String, u32, u32) {
    let session = session.lock().await;
    (
        session.current_dir.clone(),
        session.home_dir.clone(),
        session.uid,
        session.gid,
    )
}

/// Uniform refusal substituted for every mutating verb when the server
/// runs in read-only mode.
pub async fn handle_no_permission(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    send_response(&writer, b"550 No access.\r\n").await?;
    Ok(true)
}
