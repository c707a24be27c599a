use std::sync::Arc;

use sysinfo::{System, SystemExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_multiline;
use crate::server::ServerState;
use crate::session::Session;

/// SITE FREE: memory statistics report.
pub async fn handle_site_free_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    let sys = System::new_all();
    let lines = [
        String::from("              total       used       free"),
        format!(
            "Mem (KiB): {:>10} {:>10} {:>10}",
            sys.total_memory(),
            sys.used_memory(),
            sys.free_memory()
        ),
        String::from("End."),
    ];
    send_multiline(&writer, 211, &lines).await?;
    Ok(true)
}
