//! Client-side connection handling.
//!
//! A [`Connection`] is opened with its read side paused: nothing is read from
//! the socket until the caller explicitly hands the read half to a reader
//! such as [`drain_inbound`]. The setup frame can therefore always be written
//! before any inbound traffic is consumed.

use std::{io, net::SocketAddr};

use log::info;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

pub mod inbound;
pub mod socket;

pub use inbound::{InboundStats, drain_inbound};
pub use socket::{SocketOptions, connect};

/// An established TCP connection whose read side is not yet consumed.
#[derive(Debug)]
pub struct Connection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Connect to `addr` with `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn open(addr: SocketAddr, options: &SocketOptions) -> io::Result<Self> {
        let stream = connect(addr, options).await?;
        let peer_addr = stream.peer_addr()?;
        info!("connected to {peer_addr}");
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader,
            writer,
            peer_addr,
        })
    }

    /// Address of the peer.
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr { self.peer_addr }

    /// Split into the paused read half and the write half.
    #[must_use]
    pub fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) { (self.reader, self.writer) }
}
