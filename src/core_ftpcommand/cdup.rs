use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::cwd::handle_cwd_command;
use crate::server::ServerState;
use crate::session::Session;

/// Handles the CDUP command, which is CWD to the parent directory.
pub async fn handle_cdup_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    _param: Option<String>,
) -> Result<bool, std::io::Error> {
    handle_cwd_command(writer, state, session, Some(String::from(".."))).await
}
