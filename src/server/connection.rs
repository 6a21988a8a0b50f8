// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing `performance.max_connections`.
///
/// Rejected connections are dropped right away. Accepted ones are served
/// on their own task, which releases the slot when it ends.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    if !state.try_acquire_connection() {
        logger::log_warning(&format!(
            "Max connections reached ({}). Connection from {peer_addr} rejected.",
            state.active_connections()
        ));
        drop(stream);
        return;
    }

    if state.config.logging.diagnostics {
        logger::log_connection_accepted(&peer_addr);
    }

    tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(state)));
}

/// Serve one connection until the client closes it or the timeout expires.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let timeout = Duration::from_secs(state.config.performance.request_timeout);

    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&service_state), peer_addr)
        }),
    );

    match tokio::time::timeout(timeout, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&err),
        Err(_) => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout.as_secs()
            ));
        }
    }

    state.release_connection();
}
