use std::sync::Arc;

use log::{info, warn};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::{has_write_access, resolve};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the RNTO command: complete the rename started by RNFR. The
/// pending source is consumed either way, so a failed rename does not
/// leak into the next command.
pub async fn handle_rnto_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, uid, gid) = path_context(&session).await;
    let target = match param {
        Some(ref p) if !p.is_empty() => resolve(&current_dir, &home_dir, Some(p.as_str())),
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    let source = match session.lock().await.rename_from.take() {
        Some(source) => source,
        None => {
            send_response(&writer, b"503 RNFR required first.\r\n").await?;
            return Ok(true);
        }
    };

    if !has_write_access(uid, gid, &target, &home_dir) {
        warn!("RNTO denied for uid {} at {}", uid, target);
        send_response(&writer, b"550 No access.\r\n").await?;
        return Ok(true);
    }

    match tokio::fs::rename(&source, &target).await {
        Ok(()) => {
            info!("Renamed {} to {}", source, target);
            send_response(&writer, b"250 Rename successful.\r\n").await?;
        }
        Err(e) => {
            warn!("RNTO failed for {} -> {}: {}", source, target, e);
            send_response(&writer, b"550 Rename failed.\r\n").await?;
        }
    }
    Ok(true)
}
