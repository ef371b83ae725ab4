//! Reassembly of the byte stream received from a client into whole [`Message`]s.

use crate::protocol::constants::MAX_PENDING_BYTES;
use crate::protocol::messages::{Message, TERMINATOR};

/// Growable buffer keeping the bytes received from one connection until they form complete messages.
#[derive(Default, Debug)]
pub struct Accumulator {
    pending: Vec<u8>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Decode every complete message accumulated so far, in arrival order, and keep the unterminated remainder.
    ///
    /// Segments that don't decode are dropped. A remainder longer than [`MAX_PENDING_BYTES`] can't belong to a sane
    /// client and is thrown away too.
    pub fn drain_messages(&mut self) -> Vec<Message> {
        let messages = match self.pending.iter().rposition(|&b| b == TERMINATOR) {
            Some(last_terminator) => {
                let complete: Vec<u8> = self.pending.drain(..=last_terminator).collect();
                complete
                    .split(|&b| b == TERMINATOR)
                    .filter_map(decode_segment)
                    .collect()
            }
            None => Vec::new(),
        };
        if self.pending.len() > MAX_PENDING_BYTES {
            log::debug!(
                "Dropping {} unterminated bytes from the receive buffer.",
                self.pending.len()
            );
            self.pending.clear();
        }
        messages
    }
}

fn decode_segment(segment: &[u8]) -> Option<Message> {
    let text = String::from_utf8_lossy(segment);
    if text.trim().is_empty() {
        return None;
    }
    match Message::decode_body(&text) {
        Ok(message) => Some(message),
        Err(e) => {
            log::trace!("Dropping segment `{}` : {e}.", text.escape_debug());
            None
        }
    }
}
