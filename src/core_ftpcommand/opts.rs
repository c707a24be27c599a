use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the OPTS command: only the common UTF-8 case is accepted.
pub async fn handle_opts_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    match param {
        Some(option) if option.eq_ignore_ascii_case("UTF8 ON") => {
            send_response(&writer, b"200 Always in UTF8 mode.\r\n").await?;
        }
        _ => {
            send_response(&writer, b"501 Unknown option.\r\n").await?;
        }
    }
    Ok(true)
}
