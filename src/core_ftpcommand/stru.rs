use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the STRU command. Obsolete, but included for compatibility;
/// only file structure is supported.
pub async fn handle_stru_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    match param {
        None => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        }
        Some(arg) if arg.eq_ignore_ascii_case("F") => {
            send_response(&writer, b"200 OK.\r\n").await?;
        }
        Some(_) => {
            send_response(&writer, b"504 File structure not supported.\r\n").await?;
        }
    }
    Ok(true)
}
