use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::constants::REQUEST_BUFFER_SIZE;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_network::data;
use crate::helpers::send_response;
use crate::server::ServerState;
use crate::session::Session;

/// Splits a request line into a case-folded verb and its parameter.
///
/// Returns None for an empty line, which the control loop treats as an
/// implicit QUIT. The parameter is None when the client sent no parameter
/// at all and Some("") when the verb was followed by whitespace only;
/// handlers distinguish the two.
pub fn parse_request(request: &str) -> Option<(String, Option<String>)> {
    if request.is_empty() {
        return None;
    }
    match request.split_once(|c: char| c.is_whitespace()) {
        Some((verb, param)) => Some((
            verb.to_ascii_uppercase(),
            Some(param.trim_start().to_string()),
        )),
        None => Some((request.to_ascii_uppercase(), None)),
    }
}

/// Accept loop for the control port. The session ceiling and the
/// duplicate-address check run before a session object exists; refused
/// connections get a 421 and are closed without registration.
pub async fn start_server(state: Arc<ServerState>) -> Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.listen_address, state.config.server.listen_port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("New control connection from {}", peer);

        let refuse = {
            let registry = state.registry.lock().await;
            registry.len() >= state.config.server.max_sessions
                || !registry.find_by_ip(peer.ip()).await.is_empty()
        };
        if refuse {
            warn!("Refusing connection from {}: too many connections", peer);
            refuse_connection(socket).await;
            continue;
        }

        let (read_half, write_half) = socket.into_split();
        let ctrl_writer = Arc::new(Mutex::new(write_half));
        let session = Arc::new(Mutex::new(Session::new(
            peer.ip(),
            peer.port(),
            Arc::clone(&ctrl_writer),
        )));
        state.registry.lock().await.register(Arc::clone(&session));

        let greeting = format!("220 {}\r\n", state.config.server.server_name);
        if send_response(&ctrl_writer, greeting.as_bytes()).await.is_err() {
            state.registry.lock().await.deregister(&session);
            continue;
        }

        let task_state = Arc::clone(&state);
        let task_session = Arc::clone(&session);
        let handle = tokio::spawn(async move {
            handle_control_connection(read_half, ctrl_writer, task_state, task_session).await;
        });
        session.lock().await.control_task = Some(handle);
    }
}

async fn refuse_connection(mut socket: TcpStream) {
    let _ = socket.write_all(b"421 Too many connections.\r\n").await;
    let _ = socket.shutdown().await;
}

/// Runs the command loop, then tears the session down whichever way the
/// loop ended: QUIT, protocol violation, or channel error.
async fn handle_control_connection(
    read_half: OwnedReadHalf,
    ctrl_writer: Arc<Mutex<OwnedWriteHalf>>,
    state: Arc<ServerState>,
    session: Arc<Mutex<Session>>,
) {
    let client_ip = session.lock().await.client_ip;
    if let Err(e) = control_loop(read_half, &ctrl_writer, &state, &session).await {
        debug!("Control channel error for {}: {}", client_ip, e);
    }
    data::close_data_connection(&session).await;
    state.registry.lock().await.deregister(&session);
    let _ = ctrl_writer.lock().await.shutdown().await;
    info!("Connection closed for {}", client_ip);
}

/// The per-session state machine: read a line, decode verb and parameter,
/// dispatch, repeat until a handler signals termination. One command is in
/// flight per session at a time; concurrency exists only across sessions.
async fn control_loop(
    read_half: OwnedReadHalf,
    ctrl_writer: &Arc<Mutex<OwnedWriteHalf>>,
    state: &Arc<ServerState>,
    session: &Arc<Mutex<Session>>,
) -> Result<(), std::io::Error> {
    let handlers = initialize_command_handlers(state.config.server.readonly);
    let mut reader = BufReader::new(read_half);
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let n = (&mut reader)
            .take(REQUEST_BUFFER_SIZE)
            .read_line(&mut buffer)
            .await?;
        if n == 0 {
            debug!("Client disconnected without QUIT");
            break;
        }
        if n as u64 >= REQUEST_BUFFER_SIZE && !buffer.ends_with('\n') {
            warn!("Oversized request line; closing session");
            break;
        }

        let request = buffer.trim_end_matches(['\r', '\n']);
        let (verb, param) = match parse_request(request) {
            Some(parsed) => parsed,
            // Some clients drop the connection with a bare line ending.
            None => break,
        };

        if verb == "PASS" {
            info!("PASS ********");
        } else {
            match &param {
                Some(p) => info!("{} {}", verb, p),
                None => info!("{}", verb),
            }
        }

        session.lock().await.touch();

        let command = match FtpCommand::from_str(&verb) {
            Some(command) => command,
            None => {
                send_response(ctrl_writer, b"502 Command not implemented.\r\n").await?;
                continue;
            }
        };
        let handler = match handlers.get(&command) {
            Some(handler) => Arc::clone(handler),
            None => {
                send_response(ctrl_writer, b"502 Command not implemented.\r\n").await?;
                continue;
            }
        };

        match (*handler)(
            Arc::clone(ctrl_writer),
            Arc::clone(state),
            Arc::clone(session),
            param,
        )
        .await
        {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!("Error handling {}: {}", verb, e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_means_implicit_quit() {
        assert!(parse_request("").is_none());
    }

    #[test]
    fn bare_verb_has_no_parameter() {
        let (verb, param) = parse_request("quit").unwrap();
        assert_eq!(verb, "QUIT");
        assert_eq!(param, None);
    }

    #[test]
    fn trailing_whitespace_yields_an_empty_parameter() {
        let (verb, param) = parse_request("CWD ").unwrap();
        assert_eq!(verb, "CWD");
        assert_eq!(param, Some(String::new()));
    }

    #[test]
    fn parameter_keeps_interior_spaces() {
        let (verb, param) = parse_request("stor file name.txt").unwrap();
        assert_eq!(verb, "STOR");
        assert_eq!(param, Some(String::from("file name.txt")));
    }

    #[test]
    fn whitespace_runs_between_verb_and_parameter_collapse() {
        let (verb, param) = parse_request("CWD    /tmp").unwrap();
        assert_eq!(verb, "CWD");
        assert_eq!(param, Some(String::from("/tmp")));
    }
}
