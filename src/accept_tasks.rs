//! Seating incoming connections in the match, one at a time.

use std::fmt::Display;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nix::sys::socket::{setsockopt, sockopt};
use rand::distributions::{Alphanumeric, DistString};
use tokio::net::{TcpListener, TcpStream};

use crate::game::{outbox_channel, SharedMatch};
use crate::session::Session;

/// Number of consecutive accept failures at which the acceptor starts backing off.
const MAX_FAILURES: u32 = 3;
/// Pause taken once [`MAX_FAILURES`] is hit, before accepting again.
const ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Acceptor of incoming connections, turning each one into either a [`Session`] or a refusal.
pub struct SeatAcceptor {
    listener: TcpListener,
    consecutive_accept_fail_count: u32,
}

impl SeatAcceptor {
    /// Create a new [`SeatAcceptor`], which will seat connections incoming on the given [`TcpListener`].
    pub fn new(tcp_listener: TcpListener) -> SeatAcceptor {
        SeatAcceptor {
            listener: tcp_listener,
            consecutive_accept_fail_count: 0,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Await an incoming TCP connection and try to seat it.
    ///
    /// * If both slots are taken, the connection is closed right away and [`None`] is returned.
    /// * Otherwise the player is given the first free slot, with its
    ///   [`Message::PlayerAssignment`](crate::protocol::Message::PlayerAssignment) queued before anything else. The
    ///   returned [`Session`] owns the slot and must then be run to serve it.
    ///
    /// Cancel safe : once a connection is accepted, nothing is awaited until the [`Session`] is returned.
    ///
    /// Accept failures are never fatal. After [`MAX_FAILURES`] in a row, this waits [`ACCEPT_BACKOFF`] before
    /// returning.
    pub async fn seat_next_connection(&mut self, shared: &Arc<SharedMatch>) -> Option<Session> {
        let id = Alphanumeric.sample_string(&mut rand::thread_rng(), 8);

        let stream = match tcp_accept_with_opts(&mut self.listener).await {
            Ok(stream) => stream,
            Err(e) => {
                self.handle_tcp_accept_error(&id, e).await;
                return None;
            }
        };
        self.consecutive_accept_fail_count = 0;

        let (reader, writer) = stream.into_split();
        let (outbox, frames) = outbox_channel();
        let Some(player) = shared.join(outbox) else {
            log::info!("{id}: Both player slots are taken. Closing the connection.");
            return None;
        };

        log::info!("{id}: Seated as player {}.", u8::from(player));
        Some(Session::new(id, player, reader, writer, frames, shared.clone()))
    }

    /// Log the error received, and back off if [`Self`] has encountered [`MAX_FAILURES`] consecutive errors.
    async fn handle_tcp_accept_error<D: Display>(&mut self, id: &D, e: io::Error) {
        self.consecutive_accept_fail_count += 1;
        if self.consecutive_accept_fail_count < MAX_FAILURES {
            log::warn!(
                "{id}: Accepting an incoming connection failed [{}/{MAX_FAILURES}] with error : {e}.",
                self.consecutive_accept_fail_count
            );
        } else {
            log::error!(
                "{id}: Accepting an incoming connection failed [{}/{MAX_FAILURES}] with error : {e}. \
                        Threshold hit, pausing for {ACCEPT_BACKOFF:?}.",
                self.consecutive_accept_fail_count
            );
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            self.consecutive_accept_fail_count = 0;
        }
    }
}

/// Accept a tcp connection from the listener, and set the socket to no delay to disable Nagle's algorithm.
async fn tcp_accept_with_opts(listener: &mut TcpListener) -> io::Result<TcpStream> {
    let (stream, address) = listener.accept().await?;
    log::trace!("Accepted a TCP connection from {address}.");
    setsockopt(&stream, sockopt::TcpNoDelay, &true)?;
    Ok(stream)
}
