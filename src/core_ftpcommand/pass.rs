use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::constants::{ANONYMOUS_USER, AUTH_THROTTLE_MS};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the PASS command. A missing account and a wrong password get
/// the same throttled response, so the login prompt leaks nothing about
/// which usernames exist.
pub async fn handle_pass_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let password = param.unwrap_or_default();
    let username = session.lock().await.username.clone();

    if username == ANONYMOUS_USER {
        send_response(&writer, b"503 Login with USER first.\r\n").await?;
        return Ok(true);
    }
    if state.credentials.is_empty() {
        // Bootstrap mode already granted the login at USER time.
        send_response(&writer, b"230 Login successful.\r\n").await?;
        return Ok(true);
    }

    match state.credentials.lookup(&username) {
        Some(record) if record.verify(&password) => {
            let home_exists = tokio::fs::metadata(&record.home_dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            {
                let mut session = session.lock().await;
                session.uid = record.uid;
                session.gid = record.gid;
                session.home_dir = record.home_dir.clone();
                session.current_dir = if home_exists {
                    record.home_dir.clone()
                } else {
                    String::from("/")
                };
            }
            info!("User {} logged in", username);
            send_response(&writer, b"230 Login successful.\r\n").await?;
            Ok(true)
        }
        _ => {
            // Throttle repeated bad attempts.
            sleep(Duration::from_millis(AUTH_THROTTLE_MS)).await;
            warn!("Failed login attempt for {}", username);
            send_response(&writer, b"430 Invalid username or password.\r\n").await?;
            Ok(false)
        }
    }
}
