use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::constants::DATA_CHUNK_SIZE;
use crate::core_ftpcommand::utils::path_context;
use crate::core_network::data;
use crate::core_path::resolver::{has_write_access, resolve};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the STOR command: receive a file from the client over the
/// data channel.
///
/// The path is resolved before the access check runs, so an upload
/// aimed outside the home via `..` is judged by where it actually lands.
pub async fn handle_stor_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, uid, gid) = path_context(&session).await;
    let filepath = match param {
        Some(ref p) if !p.is_empty() => resolve(&current_dir, &home_dir, Some(p.as_str())),
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    if !has_write_access(uid, gid, &filepath, &home_dir) {
        warn!("STOR denied for uid {} at {}", uid, filepath);
        send_response(&writer, b"550 No access.\r\n").await?;
        return Ok(true);
    }

    if !data::verify_data_connection(&session).await {
        send_response(&writer, b"426 Data connection closed. Transfer aborted.\r\n").await?;
        return Ok(true);
    }

    send_response(&writer, b"150 Transferring file.\r\n").await?;

    let data_stream = session.lock().await.data_stream.clone();
    let result = match data_stream {
        Some(stream) => receive_file(&filepath, &stream).await,
        None => Err(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "data stream vanished",
        )),
    };

    match result {
        Ok(bytes) => {
            info!("Stored {} ({} bytes)", filepath, bytes);
            send_response(&writer, b"226 Transfer finished.\r\n").await?;
        }
        Err(e) => {
            error!("STOR failed for {}: {}", filepath, e);
            send_response(&writer, b"451 Error writing file.\r\n").await?;
        }
    }
    data::close_data_connection(&session).await;
    Ok(true)
}

async fn receive_file(
    filepath: &str,
    stream: &Arc<Mutex<TcpStream>>,
) -> Result<u64, std::io::Error> {
    let mut file = tokio::fs::File::create(filepath).await?;
    let mut stream = stream.lock().await;
    let mut buffer = vec![0u8; DATA_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let bytes_read = stream.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read]).await?;
        total += bytes_read as u64;
    }
    file.flush().await?;
    Ok(total)
}
