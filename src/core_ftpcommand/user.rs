use std::sync::Arc;

use log::info;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::constants::{NOBODY_GID, NOBODY_UID};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the USER command: record the name and prompt for a password.
/// With no credential records loaded the server runs in no-auth bootstrap
/// mode and grants an anonymous login immediately.
pub async fn handle_user_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let username = match param {
        Some(name) if !name.is_empty() => name,
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    if state.credentials.is_empty() {
        {
            let mut session = session.lock().await;
            session.username = username.clone();
            session.uid = NOBODY_UID;
            session.gid = NOBODY_GID;
            session.home_dir = String::from("/");
        }
        info!("Anonymous login for {} (no credentials loaded)", username);
        send_response(&writer, b"230 Login successful.\r\n").await?;
    } else {
        session.lock().await.username = username.clone();
        let prompt = format!("331 Password required for {}.\r\n", username);
        send_response(&writer, prompt.as_bytes()).await?;
    }

    Ok(true)
}
