//! UDP packet source (IPv4 unicast or multicast)

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, trace};

use crate::constants::{TS_PACKET_SIZE, TS_SYNC_BYTE};
use crate::packet::{PacketMetadata, TsPacket};

use super::PacketSource;

/// Receives TS packets from a bound UDP socket, joining the multicast
/// group when the address calls for it. Timestamps are left to the ingest
/// worker; the network stack does not stamp them.
pub struct UdpSource {
    addr: SocketAddr,
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
}

impl UdpSource {
    pub fn new(addr: SocketAddr) -> Self {
        UdpSource {
            addr,
            socket: None,
            buf: vec![0u8; 2048],
        }
    }
}

impl PacketSource for UdpSource {
    fn open(&mut self) -> io::Result<()> {
        let ip = match self.addr.ip() {
            IpAddr::V4(v4) => v4,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "only IPv4 is supported",
                ))
            }
        };

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&self.addr.into())?;

        if ip.is_multicast() {
            let iface = Ipv4Addr::UNSPECIFIED; // default interface
            socket.join_multicast_v4(&ip, &iface)?;
        }

        debug!(addr = %self.addr, "UDP source bound");
        self.socket = Some(socket.into());
        Ok(())
    }

    fn receive(
        &mut self,
        packets: &mut [TsPacket],
        _metadata: &mut [PacketMetadata],
    ) -> io::Result<usize> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "source not open"))?;

        loop {
            let n = socket.recv(&mut self.buf)?;
            let count = frame_datagram(&self.buf[..n], packets);
            if count > 0 {
                return Ok(count);
            }
            // Datagram carried no usable frames; keep waiting.
            trace!(bytes = n, "datagram without TS frames");
        }
    }

    fn close(&mut self) {
        self.socket = None;
    }
}

/// Split a datagram into 188-byte frames, dropping unsynchronized frames
/// and any trailing partial frame.
fn frame_datagram(buf: &[u8], packets: &mut [TsPacket]) -> usize {
    let mut count = 0;
    for chunk in buf.chunks_exact(TS_PACKET_SIZE) {
        if chunk[0] != TS_SYNC_BYTE {
            continue; // bad sync
        }
        if count == packets.len() {
            break;
        }
        packets[count].0.copy_from_slice(chunk);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(n: usize) -> Vec<TsPacket> {
        vec![TsPacket::null(); n]
    }

    #[test]
    fn frames_aligned_datagram() {
        let mut datagram = Vec::new();
        for pcr in [0u64, 300, 600] {
            datagram.extend_from_slice(&TsPacket::with_pcr(pcr).0);
        }
        let mut packets = slots(8);
        assert_eq!(frame_datagram(&datagram, &mut packets), 3);
        assert_eq!(packets[1].pcr(), Some(300));
    }

    #[test]
    fn drops_trailing_partial_frame() {
        let mut datagram = Vec::new();
        datagram.extend_from_slice(&TsPacket::with_pcr(42).0);
        datagram.extend_from_slice(&[0x47; 100]); // truncated frame
        let mut packets = slots(8);
        assert_eq!(frame_datagram(&datagram, &mut packets), 1);
    }

    #[test]
    fn drops_unsynchronized_frames() {
        let mut datagram = vec![0u8; TS_PACKET_SIZE]; // sync byte 0x00
        datagram.extend_from_slice(&TsPacket::with_pcr(42).0);
        let mut packets = slots(8);
        assert_eq!(frame_datagram(&datagram, &mut packets), 1);
        assert_eq!(packets[0].pcr(), Some(42));
    }

    #[test]
    fn respects_batch_capacity() {
        let mut datagram = Vec::new();
        for _ in 0..4 {
            datagram.extend_from_slice(&TsPacket::null().0);
        }
        let mut packets = slots(2);
        assert_eq!(frame_datagram(&datagram, &mut packets), 2);
    }

    #[test]
    fn receive_before_open_fails() {
        let mut source = UdpSource::new("127.0.0.1:9999".parse().unwrap());
        let mut packets = slots(1);
        let mut metadata = vec![PacketMetadata::default(); 1];
        assert!(source.receive(&mut packets, &mut metadata).is_err());
    }
}
