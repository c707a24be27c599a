use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::resolve;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the CWD command: resolve the target lexically, then confirm it
/// is a directory before adopting it.
pub async fn handle_cwd_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, _, _) = path_context(&session).await;
    let target = resolve(&current_dir, &home_dir, param.as_deref());

    match tokio::fs::metadata(&target).await {
        Ok(metadata) if metadata.is_dir() => {
            session.lock().await.current_dir = target.clone();
            let response = format!("250 {}\r\n", target);
            send_response(&writer, response.as_bytes()).await?;
        }
        _ => {
            send_response(&writer, b"550 No such directory.\r\n").await?;
        }
    }

    Ok(true)
}
