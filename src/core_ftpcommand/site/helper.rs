use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::session::Session;

/// Gate for privileged SITE subcommands. Answers 550 itself when the
/// session is not root or in the root group, so callers just bail out.
pub async fn require_privileged(
    writer: &Arc<Mutex<OwnedWriteHalf>>,
    session: &Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    let (uid, gid) = {
        let session = session.lock().await;
        (session.uid, session.gid)
    };
    if uid == 0 || gid == 0 {
        Ok(true)
    } else {
        send_response(writer, b"550 Permission denied.\r\n").await?;
        Ok(false)
    }
}
