use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Sends a single-line response on the control channel.
pub async fn send_response(
    writer: &Arc<Mutex<OwnedWriteHalf>>,
    message: &[u8],
) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

/// Sends a multi-line response: every line but the last carries a dash
/// after the code, the last line closes the reply.
pub async fn send_multiline(
    writer: &Arc<Mutex<OwnedWriteHalf>>,
    code: u16,
    lines: &[String],
) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    if let Some((last, rest)) = lines.split_last() {
        for line in rest {
            writer
                .write_all(format!("{}-{}\r\n", code, line).as_bytes())
                .await?;
        }
        writer
            .write_all(format!("{} {}\r\n", code, last).as_bytes())
            .await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Formats a file timestamp the way `ls -l` does: hour and minute for
/// entries younger than a year, the year for anything older.
pub fn format_timestamp(timestamp: SystemTime) -> String {
    const ONE_YEAR_SECS: i64 = 31_536_000;
    let datetime: DateTime<Local> = timestamp.into();
    let age = Local::now().signed_duration_since(datetime);
    if age.num_seconds() < ONE_YEAR_SECS {
        datetime.format("%b %e %H:%M").to_string()
    } else {
        datetime.format("%b %e  %Y").to_string()
    }
}

/// Formats an uptime in seconds as `N days, HH:MM`.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{} days, {:02}:{:02}", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(0), "0 days, 00:00");
        assert_eq!(format_uptime(61), "0 days, 00:01");
        assert_eq!(format_uptime(90061), "1 days, 01:01");
    }

    #[test]
    fn recent_timestamps_show_the_time() {
        let formatted = format_timestamp(SystemTime::now());
        assert!(formatted.contains(':'));
    }

    #[test]
    fn old_timestamps_show_the_year() {
        let two_years = Duration::from_secs(2 * 31_536_000);
        let old = SystemTime::now() - two_years;
        let formatted = format_timestamp(old);
        assert!(!formatted.contains(':'));
    }
}
