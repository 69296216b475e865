//! ggrs `NonBlockingSocket` over [`LocalSocket`]

use std::io;

use ggrs::{Message, NonBlockingSocket};

use super::socket::{LocalSocket, parse_addr};

impl NonBlockingSocket<String> for LocalSocket {
    fn send_to(&mut self, msg: &Message, addr: &String) {
        let target = match parse_addr(addr) {
            Ok(target) => target,
            Err(e) => {
                self.stats.send_errors += 1;
                tracing::warn!(error = %e, "Dropping message to bad address");
                return;
            }
        };
        let data = match bincode::serialize(msg) {
            Ok(data) => data,
            Err(e) => {
                self.stats.send_errors += 1;
                tracing::warn!(error = %e, "Failed to encode message");
                return;
            }
        };
        match self.socket.send_to(&data, target) {
            Ok(_) => self.stats.sent += 1,
            // full send buffer; ggrs resends unacknowledged input
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                self.stats.send_errors += 1;
                tracing::warn!(error = %e, %target, "Send failed");
            }
        }
    }

    fn receive_all_messages(&mut self) -> Vec<(String, Message)> {
        let mut messages = Vec::new();
        loop {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, from)) => match bincode::deserialize::<Message>(&self.recv_buf[..len]) {
                    Ok(msg) => {
                        self.stats.received += 1;
                        messages.push((from.to_string(), msg));
                    }
                    Err(e) => {
                        self.stats.malformed += 1;
                        tracing::debug!(error = %e, %from, "Ignoring malformed datagram");
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // ICMP port unreachable surfaces here on some platforms
                Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Receive error");
                    break;
                }
            }
        }
        messages
    }
}
