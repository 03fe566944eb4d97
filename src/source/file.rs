//! File packet source for raw 188-byte-aligned TS captures

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use tracing::debug;

use crate::packet::{PacketMetadata, TsPacket};

use super::PacketSource;

/// Reads TS packets from a file; `receive` returns 0 at end of file,
/// which ends that input leg cleanly. Timestamps are left to the ingest
/// worker.
pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        FileSource { path, reader: None }
    }
}

impl PacketSource for FileSource {
    fn open(&mut self) -> io::Result<()> {
        let file = File::open(&self.path)?;
        debug!(path = %self.path.display(), "file source opened");
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    fn receive(
        &mut self,
        packets: &mut [TsPacket],
        _metadata: &mut [PacketMetadata],
    ) -> io::Result<usize> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "source not open"))?;

        let mut count = 0;
        while count < packets.len() {
            match reader.read_exact(&mut packets[count].0) {
                Ok(()) => {
                    if packets[count].sync_ok() {
                        count += 1;
                    }
                    // Unsynchronized frame: skip it and keep reading.
                }
                // A trailing partial frame reads as end of file.
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
