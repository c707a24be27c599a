use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::constants::DATA_READY_RETRY_MS;
use crate::session::Session;

/// Readiness probe for commands that need the data channel.
///
/// A passive listener accepts asynchronously relative to command
/// processing, so the stream may not have landed on the session yet when
/// LIST or RETR arrives. One bounded retry after a short delay keeps the
/// handler from blocking forever; callers answer 426 when this returns
/// false.
pub async fn verify_data_connection(session: &Arc<Mutex<Session>>) -> bool {
    if session.lock().await.data_stream.is_some() {
        return true;
    }
    sleep(Duration::from_millis(DATA_READY_RETRY_MS)).await;
    session.lock().await.data_stream.is_some()
}

/// Tears down the data channel after a transfer. Must run on every exit
/// path, success or failure, so a session never carries stale handles into
/// the next command.
pub async fn close_data_connection(session: &Arc<Mutex<Session>>) {
    session.lock().await.close_data_connection().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::{TcpListener, TcpStream};

    async fn session_pair() -> Arc<Mutex<Session>> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let _server_side = listener.accept().await.unwrap();
        let (_read_half, write_half) = client.into_split();
        Arc::new(Mutex::new(Session::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            50000,
            Arc::new(Mutex::new(write_half)),
        )))
    }

    #[tokio::test]
    async fn probe_fails_when_no_data_connection_arrives() {
        let session = session_pair().await;
        assert!(!verify_data_connection(&session).await);
    }

    #[tokio::test]
    async fn probe_sees_a_stream_that_arrives_during_the_retry() {
        let session = session_pair().await;
        let delayed = Arc::clone(&session);
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let stream = TcpStream::connect(addr).await.unwrap();
            delayed.lock().await.data_stream = Some(Arc::new(Mutex::new(stream)));
        });
        assert!(verify_data_connection(&session).await);
    }
}
