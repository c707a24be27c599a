use std::sync::Arc;

use log::{error, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_network::data;
use crate::core_path::resolver::resolve;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the NLST command: bare file names over the data channel,
/// without the long-listing decoration.
pub async fn handle_nlst_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, _, _) = path_context(&session).await;
    let dirpath = resolve(&current_dir, &home_dir, param.as_deref());

    let mut entries = match tokio::fs::read_dir(&dirpath).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("NLST failed to read {}: {}", dirpath, e);
            send_response(&writer, b"451 Unable to read directory.\r\n").await?;
            return Ok(true);
        }
    };

    if !data::verify_data_connection(&session).await {
        send_response(&writer, b"426 Data connection closed. Transfer aborted.\r\n").await?;
        return Ok(true);
    }

    let opening = format!("150 {}\r\n", dirpath);
    send_response(&writer, opening.as_bytes()).await?;

    let data_stream = session.lock().await.data_stream.clone();
    let result = async {
        let stream = data_stream.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "data stream vanished")
        })?;
        let mut stream = stream.lock().await;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            stream.write_all(name.as_bytes()).await?;
            stream.write_all(b"\r\n").await?;
        }
        stream.flush().await?;
        Ok::<(), std::io::Error>(())
    }
    .await;

    match result {
        Ok(()) => send_response(&writer, b"226 Directory list sent.\r\n").await?,
        Err(e) => {
            error!("NLST transfer failed for {}: {}", dirpath, e);
            send_response(&writer, b"426 Data connection closed. Transfer aborted.\r\n").await?;
        }
    }
    data::close_data_connection(&session).await;
    Ok(true)
}
