use crate::query::DnsHeader;

/// Raw reply datagram. No structure is enforced on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsReply {
    bytes: Vec<u8>,
}

impl DnsReply {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Header of the reply, when at least 12 bytes arrived
    pub fn header(&self) -> Option<DnsHeader> {
        DnsHeader::unpack(&self.bytes)
    }

    /// Printable payload past `offset`
    pub fn version_text(&self, offset: usize) -> String {
        extract_version(&self.bytes, offset)
    }
}

/// Collect every printable, non-whitespace ASCII byte from `offset` on.
///
/// This is a scrape, not a decoder: record boundaries, lengths and TTLs are
/// not located, so it only works when the answer text is the dominant
/// printable content after the echoed question.
pub fn extract_version(reply: &[u8], offset: usize) -> String {
    reply
        .iter()
        .skip(offset)
        .filter(|byte| byte.is_ascii_graphic())
        .map(|&byte| byte as char)
        .collect()
}
