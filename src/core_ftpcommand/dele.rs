use std::sync::Arc;

use log::{info, warn};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::{has_write_access, resolve};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the DELE command: delete a file, gated by the write-access
/// policy on the resolved path.
pub async fn handle_dele_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, uid, gid) = path_context(&session).await;
    let filepath = match param {
        Some(ref p) if !p.is_empty() => resolve(&current_dir, &home_dir, Some(p.as_str())),
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    if !has_write_access(uid, gid, &filepath, &home_dir) {
        warn!("DELE denied for uid {} at {}", uid, filepath);
        send_response(&writer, b"550 No access.\r\n").await?;
        return Ok(true);
    }

    match tokio::fs::remove_file(&filepath).await {
        Ok(()) => {
            info!("Deleted {}", filepath);
            send_response(&writer, b"250 OK.\r\n").await?;
        }
        Err(e) => {
            warn!("DELE failed for {}: {}", filepath, e);
            send_response(&writer, b"550 No such file.\r\n").await?;
        }
    }
    Ok(true)
}
