use std::sync::Arc;

use log::error;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_auth::sha256aes;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// SITE PASSWD <cleartext>: emit a salted-hash credential entry suitable
/// for pasting into the configuration's credential list.
pub async fn handle_site_passwd_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    sub_arg: Option<String>,
) -> Result<bool, std::io::Error> {
    let cleartext = match sub_arg {
        Some(cleartext) if !cleartext.is_empty() => cleartext,
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    match sha256aes::create_passwd_entry(&cleartext) {
        Ok(entry) => {
            let response = format!("200 {}\r\n", entry);
            send_response(&writer, response.as_bytes()).await?;
        }
        Err(e) => {
            error!("Failed to generate credential entry: {}", e);
            send_response(&writer, b"550 Failed to generate hash.\r\n").await?;
        }
    }
    Ok(true)
}
