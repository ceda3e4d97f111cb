//! Server module
//!
//! Listener construction and the accept loop. One task per connection, no
//! coordination between requests beyond the active-connection counter.

pub mod connection;
pub mod listener;

pub use listener::create_reusable_listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config;
use crate::logger;
use connection::accept_connection;

/// Accept connections until the process is stopped.
pub async fn run(
    listener: TcpListener,
    state: Arc<config::AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
