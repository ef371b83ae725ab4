//! Wiring of the acceptor and the simulation loop around one shared match.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinSet;

use crate::accept_tasks::SeatAcceptor;
use crate::game::{run_simulation_loop, SharedMatch};
use crate::protocol::constants::LISTEN_BACKLOG;

/// Errors preventing the server from starting.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to set up a socket for {address} : {source}")]
    Socket { address: SocketAddr, source: io::Error },

    #[error("failed to listen on {address} : {source}")]
    Listen { address: SocketAddr, source: io::Error },
}

/// Bind a listening socket to the given address with a backlog of [`LISTEN_BACKLOG`].
pub fn bind_listener(address: SocketAddr) -> Result<TcpListener, ServerError> {
    let socket_error = |source| ServerError::Socket { address, source };
    let socket = match address {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(socket_error)?;
    socket.set_reuseaddr(true).map_err(socket_error)?;
    socket.bind(address).map_err(socket_error)?;
    socket
        .listen(LISTEN_BACKLOG)
        .map_err(|source| ServerError::Listen { address, source })
}

/// Run the match served on the given listener, forever.
///
/// Every task spawned - the simulation loop and one per seated connection - is aborted when this future is dropped.
pub async fn serve(listener: TcpListener, shared: Arc<SharedMatch>) {
    let mut acceptor = SeatAcceptor::new(listener);
    match acceptor.local_addr() {
        Ok(address) => log::info!("Waiting for players on {address}."),
        Err(e) => log::warn!("Listening on an unknown address : {e}."),
    }

    let mut task_set = JoinSet::new();
    task_set.spawn(run_simulation_loop(shared.clone()));
    loop {
        tokio::select! {
            // Cancel safe, a connection is never left half seated
            seated = acceptor.seat_next_connection(&shared) => {
                if let Some(session) = seated {
                    task_set.spawn(session.run());
                }
            },
            Some(joined) = task_set.join_next() => {
                if let Err(e) = joined {
                    log::error!("A server task ended abnormally : {e}.");
                }
            },
        }
    }
}
