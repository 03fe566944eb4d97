//! Packet sources: the input side of the correlation engine
//!
//! Anything implementing [`PacketSource`] plugs into a session; the two
//! built-in sources cover UDP (unicast or multicast) and raw TS files.

pub mod file;
pub mod udp;

pub use file::FileSource;
pub use udp::UdpSource;

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::MonitorError;
use crate::packet::{PacketMetadata, TsPacket};

/// Blocking input contract driven by an ingest worker.
///
/// `receive` blocks until at least one packet is available and returns the
/// number of packets written into `packets`; 0 means end of input for this
/// leg. A source either fills the `input_timestamp` of every packet it
/// returns or of none (the worker then stamps the whole batch).
pub trait PacketSource: Send {
    fn open(&mut self) -> io::Result<()>;
    fn receive(
        &mut self,
        packets: &mut [TsPacket],
        metadata: &mut [PacketMetadata],
    ) -> io::Result<usize>;
    fn close(&mut self);
}

/// Parsed input descriptor, one per input leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// UDP socket to bind + listen (IPv4 unicast or multicast).
    Udp(SocketAddr),
    /// Raw 188-byte-aligned TS file.
    File(PathBuf),
}

impl SourceSpec {
    /// Parse `udp://ADDR:PORT`, `file://PATH` or a bare filesystem path.
    pub fn parse(s: &str) -> Result<Self, MonitorError> {
        if let Some(addr) = s.strip_prefix("udp://") {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| MonitorError::Config(format!("bad UDP address '{addr}': {e}")))?;
            Ok(SourceSpec::Udp(addr))
        } else if let Some(path) = s.strip_prefix("file://") {
            Ok(SourceSpec::File(PathBuf::from(path)))
        } else if s.is_empty() {
            Err(MonitorError::Config("empty input descriptor".into()))
        } else {
            Ok(SourceSpec::File(PathBuf::from(s)))
        }
    }

    /// Build the packet source this descriptor names.
    pub fn create(&self) -> Box<dyn PacketSource> {
        match self {
            SourceSpec::Udp(addr) => Box::new(UdpSource::new(*addr)),
            SourceSpec::File(path) => Box::new(FileSource::new(path.clone())),
        }
    }
}

impl FromStr for SourceSpec {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceSpec::parse(s)
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Udp(addr) => write!(f, "udp://{addr}"),
            SourceSpec::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}
