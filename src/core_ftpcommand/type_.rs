use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the TYPE command. Implemented to satisfy clients; transfers
/// are always binary and no end-of-line translation happens.
pub async fn handle_type_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let arg = match param {
        Some(arg) if !arg.is_empty() => arg,
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    match arg.to_ascii_uppercase().as_str() {
        "A" | "A N" | "I" | "L 8" => {
            send_response(&writer, b"200 Always in binary mode.\r\n").await?;
        }
        _ => {
            send_response(&writer, b"504 Invalid type.\r\n").await?;
        }
    }
    Ok(true)
}
