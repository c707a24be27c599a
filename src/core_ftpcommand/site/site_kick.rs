use std::sync::Arc;

use log::info;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::site::helper::require_privileged;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::{evict_session, Session};

/// SITE KICK <user>: privileged forced teardown of that user's sessions.
/// The invoking session is never kicked, even when the names match.
pub async fn handle_site_kick_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    sub_arg: Option<String>,
) -> Result<bool, std::io::Error> {
    if !require_privileged(&writer, &session).await? {
        return Ok(true);
    }

    let target = match sub_arg {
        Some(target) if !target.is_empty() => target,
        _ => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };

    let victims = {
        let registry = state.registry.lock().await;
        registry.find_by_username(&target).await
    };

    let mut kicked = 0usize;
    for victim in victims {
        if Arc::ptr_eq(&victim, &session) {
            continue;
        }
        evict_session(
            &state.registry,
            &victim,
            b"421 Kicked by administrator.\r\n",
        )
        .await;
        kicked += 1;
    }

    if kicked == 0 {
        send_response(&writer, b"450 No matching session.\r\n").await?;
    } else {
        info!("Kicked {} session(s) for {}", kicked, target);
        let response = format!("200 Kicked {} session(s).\r\n", kicked);
        send_response(&writer, response.as_bytes()).await?;
    }
    Ok(true)
}
