use std::sync::Arc;

use log::warn;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::{has_write_access, resolve};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the RNFR command: record the rename source for the RNTO that
/// must follow.
pub async fn handle_rnfr_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, uid, gid) = path_context(&session).await;
    let source = match param {
        Some(ref p) if !p.is_empty() => resolve(&current_dir, &home_dir, Some(p.as_str())),
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    if !has_write_access(uid, gid, &source, &home_dir) {
        warn!("RNFR denied for uid {} at {}", uid, source);
        send_response(&writer, b"550 No access.\r\n").await?;
        return Ok(true);
    }

    if tokio::fs::metadata(&source).await.is_err() {
        send_response(&writer, b"550 No such file or directory.\r\n").await?;
        return Ok(true);
    }

    session.lock().await.rename_from = Some(source);
    send_response(&writer, b"350 Ready for RNTO.\r\n").await?;
    Ok(true)
}
