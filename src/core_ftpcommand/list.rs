use std::os::unix::fs::MetadataExt;
use std::sync::Arc;

use log::{error, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::path_context;
use crate::core_network::data;
use crate::core_path::resolver::resolve;
use crate::helpers::{format_timestamp, send_response};
use crate::server::ServerState;
use crate::session::Session;

/// Handles the LIST command: a Unix-style directory listing over the
/// data channel. Ownership and permission bits are cosmetic; the flash
/// filesystems this grew up on had neither.
pub async fn handle_list_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let (current_dir, home_dir, _, _) = path_context(&session).await;
    let dirpath = resolve(&current_dir, &home_dir, param.as_deref());

    let mut entries = match tokio::fs::read_dir(&dirpath).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("LIST failed to read {}: {}", dirpath, e);
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
    let result = match data_stream {
        Some(stream) => send_listing(&mut entries, &stream, state.config.server.readonly).await,
        None => Err(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "data stream vanished",
        )),
    };

    match result {
        Ok(()) => send_response(&writer, b"226 Directory list sent.\r\n").await?,
        Err(e) => {
            error!("LIST transfer failed for {}: {}", dirpath, e);
            send_response(&writer, b"426 Data connection closed. Transfer aborted.\r\n").await?;
        }
    }
    data::close_data_connection(&session).await;
    Ok(true)
}

async fn send_listing(
    entries: &mut tokio::fs::ReadDir,
    stream: &Arc<Mutex<TcpStream>>,
    readonly: bool,
) -> Result<(), std::io::Error> {
    let mut stream = stream.lock().await;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        let (permissions, size) = if metadata.is_dir() {
            name.push('/');
            (if readonly { "dr-xr-xr-x" } else { "drwxr-xr-x" }, 0)
        } else {
            (if readonly { "-r--r--r--" } else { "-rw-r--r--" }, metadata.len())
        };
        let mtime = metadata
            .modified()
            .map(format_timestamp)
            .unwrap_or_default();
        let line = format!(
            "{}  1  {:>4}  {:>4}  {:>10}  {:>11}  {}\r\n",
            permissions,
            display_id(metadata.uid()),
            display_id(metadata.gid()),
            size,
            mtime,
            name
        );
        stream.write_all(line.as_bytes()).await?;
    }
    stream.flush().await?;
    Ok(())
}

fn display_id(id: u32) -> String {
    if id == 0 {
        String::from("root")
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_zero_displays_as_root() {
        assert_eq!(display_id(0), "root");
        assert_eq!(display_id(1000), "1000");
    }
}
