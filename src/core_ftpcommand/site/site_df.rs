use std::sync::Arc;

use sysinfo::{DiskExt, System, SystemExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::helpers::send_multiline;
use crate::server::ServerState;
use crate::session::Session;

/// SITE DF: Unix-style `df` report of filesystem utilization.
pub async fn handle_site_df_command(
    writer: Arc<Mutex<OwnedWriteHalf>>,
    _state: Arc<ServerState>,
    _session: Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    let sys = System::new_all();
    let mut lines = vec![String::from(
        "Filesystem            Size       Used      Avail   Use%",
    )];
    for disk in sys.disks() {
        let size_kb = disk.total_space() / 1024;
        let avail_kb = disk.available_space() / 1024;
        let used_kb = size_kb.saturating_sub(avail_kb);
        let percent_used = if size_kb > 0 {
            (100 * used_kb + size_kb / 2) / size_kb
        } else {
            0
        };
        lines.push(format!(
            "{:<12} {:>9}K {:>9}K {:>9}K   {:>3}%",
            disk.name().to_string_lossy(),
            size_kb,
            used_kb,
            avail_kb,
            percent_used
        ));
    }
    lines.push(String::from("End."));
    send_multiline(&writer, 211, &lines).await?;
    Ok(true)
}
