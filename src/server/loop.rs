// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop on `listener`.
///
/// Returns once `signals` requests shutdown. Connections already accepted
/// keep running on their own tasks.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = signals.shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.active_connections());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::StaticServer;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let server = StaticServer::from_map([("index.html", "root index file")]).unwrap();
        let mut config = Config::default();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config, server));
        let signals = Arc::new(SignalHandler::new());

        let task = tokio::spawn(start_server_loop(listener, state, Arc::clone(&signals)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).await.unwrap();
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.ends_with("root index file"));

        signals.request_shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
