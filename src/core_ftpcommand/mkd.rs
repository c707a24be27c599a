use std::sync::Arc;

use log::{info, warn};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::{has_write_access, resolve};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the MKD command: create a directory, gated by the write-access
/// policy on the resolved path.
pub async fn handle_mkd_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, uid, gid) = path_context(&session).await;
    let dirpath = match param {
        Some(ref p) if !p.is_empty() => resolve(&current_dir, &home_dir, Some(p.as_str())),
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    if !has_write_access(uid, gid, &dirpath, &home_dir) {
        warn!("MKD denied for uid {} at {}", uid, dirpath);
        send_response(&writer, b"550 No access.\r\n").await?;
        return Ok(true);
    }

    match tokio::fs::create_dir(&dirpath).await {
        Ok(()) => {
            info!("Created directory {}", dirpath);
            let response = format!("257 \"{}\" directory created.\r\n", dirpath);
            send_response(&writer, response.as_bytes()).await?;
        }
        Err(e) => {
            warn!("MKD failed for {}: {}", dirpath, e);
            send_response(&writer, b"550 Failed to create directory.\r\n").await?;
        }
    }
    Ok(true)
}
