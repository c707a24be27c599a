use std::sync::Arc;
use std::time::SystemTime;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_path::resolver::resolve;
use crate::helpers::{format_timestamp, format_uptime, send_multiline, send_response};
use crate::server::ServerState;
use crate::session::Session;

/// Handles the STAT command. Without a parameter it reports server
/// status; with a path it reports on the file or directory. A directory
/// answers 213 and a file 211, matching the behavior clients of the
/// original server expect.
pub async fn handle_stat_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    match param.as_deref() {
        None | Some("") => {
            let username = session.lock().await.username.clone();
            let status = [
                state.config.server.server_name.clone(),
                format!("System date: {}", format_timestamp(SystemTime::now())),
                format!(
                    "Uptime: {}",
                    format_uptime(state.start_time.elapsed().as_secs())
                ),
                format!("Logged in as: {}", username),
                String::from("TYPE: L8, FORM: Nonprint; STRUcture: File; transfer MODE: Stream"),
                String::from("End."),
            ];
            send_multiline(&writer, 211, &status).await?;
        }
        Some(path) => {
            let (current_dir, home_dir, _, _) = path_context(&session).await;
            let target = resolve(&current_dir, &home_dir, Some(path));
            match tokio::fs::metadata(&target).await {
                Ok(metadata) if metadata.is_dir() => {
                    let response = format!("213 {}\r\n", target);
                    send_response(&writer, response.as_bytes()).await?;
                }
                Ok(_) => {
                    let response = format!("211 {}\r\n", target);
                    send_response(&writer, response.as_bytes()).await?;
                }
                Err(_) => {
                    send_response(&writer, b"550 No such file or directory.\r\n").await?;
                }
            }
        }
    }
    Ok(true)
}
