use std::time::Duration;

// ============================================================================
// Network constants
// ============================================================================

/// Default destination port of a name server
pub const DEFAULT_DNS_PORT: u16 = 53;
/// Receive buffer size for a single reply datagram
pub const REPLY_BUFFER_SIZE: usize = 1024;

// ============================================================================
// Timeout constants
// ============================================================================

/// Default time to wait for a reply
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// DNS message constants
// ============================================================================

/// Transaction ID used unless randomization is requested
pub const DEFAULT_TRANSACTION_ID: u16 = 0xC0DE;
/// Length of the RFC 1035 message header
pub const HEADER_LEN: usize = 12;
/// TXT record type
pub const QTYPE_TXT: u16 = 16;
/// CHAOS class
pub const QCLASS_CHAOS: u16 = 3;
/// Labels of the queried name
pub const VERSION_BIND_LABELS: [&str; 2] = ["version", "bind"];

pub fn is_valid_timeout(secs: u64) -> bool {
    (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs)
}

pub fn is_valid_port(port: u16) -> bool {
    port != 0
}
