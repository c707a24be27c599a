use std::sync::Arc;

use log::{info, warn};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::core_ftpcommand::site::{
    site_df, site_free, site_kick, site_passwd, site_shutdown, site_uptime, site_who,
};
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// RFC 959 leaves SITE open for services outside the common command set.
/// This server uses it for administrative introspection: disk and memory
/// reports, the who's-online list, credential hashing, and the privileged
/// kick and shutdown operations.
pub async fn handle_site_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
    param: Option<String>,
) -> Result<bool, std::io::Error> {
    let arg = param.unwrap_or_default();
    let mut parts = arg.trim().splitn(2, char::is_whitespace);
    let subcommand = match parts.next() {
        Some(sub) if !sub.is_empty() => sub.to_ascii_uppercase(),
        _ => {
            warn!("SITE with no subcommand");
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(true);
        }
    };
    let sub_arg = parts.next().map(|s| s.trim().to_string());

    info!("SITE {}", subcommand);
    match subcommand.as_str() {
        "DF" => site_df::handle_site_df_command(writer, state, session).await,
        "FREE" => site_free::handle_site_free_command(writer, state, session).await,
        "WHO" => site_who::handle_site_who_command(writer, state, session).await,
        "KICK" => site_kick::handle_site_kick_command(writer, state, session, sub_arg).await,
        "PASSWD" => site_passwd::handle_site_passwd_command(writer, state, session, sub_arg).await,
        "UPTIME" => site_uptime::handle_site_uptime_command(writer, state, session).await,
        "SHUTDOWN" => site_shutdown::handle_site_shutdown_command(writer, state, session).await,
        _ => {
            warn!("Unknown SITE subcommand: {}", subcommand);
            send_response(&writer, b"504 Parameter not supported.\r\n").await?;
            Ok(true)
        }
    }
}
