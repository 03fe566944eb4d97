//! Constants for MPEG-TS packet handling and PCR correlation

/// MPEG-TS packet constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;

/// PCR constants
pub const PCR_CLOCK_HZ: u64 = 27_000_000; // 27 MHz
pub const PCR_TICKS_PER_MS: f64 = 27_000.0;
pub const PCR_WRAP: u64 = (1u64 << 33) * 300; // 42-bit PCR wrap-around point

/// Pairing policy defaults (historical values, overridable per session)
pub const DEFAULT_PAIR_SKEW_MS: f64 = 10.0;
pub const DEFAULT_QUEUE_SOFT_CAP: usize = 10;

/// Maximum input packets to read at a time
pub const DEFAULT_PACKET_BATCH_MAX: usize = 128;

/// Number of input legs a session correlates. The pairing algorithm is
/// specifically binary.
pub const INPUT_COUNT: usize = 2;
