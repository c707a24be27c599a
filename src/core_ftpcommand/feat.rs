use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_multiline;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the FEAT command: multi-line list of extra capabilities,
/// RFC 2389.
pub async fn handle_feat_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    let features = [
        String::from("Extensions supported:"),
        String::from("SIZE"),
        String::from("EPSV"),
        String::from("End."),
    ];
    send_multiline(&writer, 211, &features).await?;
    Ok(true)
}
