use std::sync::Arc;

use log::{error, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::constants::DATA_CHUNK_SIZE;
use crate::core_ftpcommand::utils::path_context;
use crate::core_network::data;
use crate::core_path::resolver::resolve;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the RETR command: stream a file to the client over the data
/// channel negotiated by PASV/EPSV/PORT.
pub async fn handle_retr_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let filepath = match param {
        Some(ref p) if !p.is_empty() => {
            let (current_dir, home_dir, _, _) = path_context(&session).await;
            resolve(&current_dir, &home_dir, Some(p.as_str()))
        }
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    match tokio::fs::metadata(&filepath).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => {
            send_response(&writer, b"550 No such file.\r\n").await?;
            return Ok(true);
        }
    }

    if !data::verify_data_connection(&session).await {
        send_response(&writer, b"426 Data connection closed. Transfer aborted.\r\n").await?;
        return Ok(true);
    }

    send_response(&writer, b"150 Transferring file.\r\n").await?;

    let data_stream = session.lock().await.data_stream.clone();
    let result = match data_stream {
        Some(stream) => send_file(&filepath, &stream).await,
        None => Err(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "data stream vanished",
        )),
    };

    match result {
        Ok(bytes) => {
            info!("Sent {} ({} bytes)", filepath, bytes);
            send_response(&writer, b"226 Transfer finished.\r\n").await?;
        }
        Err(e) => {
            error!("RETR failed for {}: {}", filepath, e);
            send_response(&writer, b"451 Error reading file.\r\n").await?;
        }
    }
    data::close_data_connection(&session).await;
    Ok(true)
}

/// Reads the file in small chunks to keep buffer requirements bounded.
async fn send_file(
    filepath: &str,
    stream: &Arc<Mutex<TcpStream>>,
) -> Result<u64, std::io::Error> {
    let mut file = tokio::fs::File::open(filepath).await?;
    let mut stream = stream.lock().await;
    let mut buffer = vec![0u8; DATA_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        stream.write_all(&buffer[..bytes_read]).await?;
        total += bytes_read as u64;
    }
    stream.flush().await?;
    Ok(total)
}
