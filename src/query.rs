use crate::constants::{
    DEFAULT_TRANSACTION_ID, HEADER_LEN, QCLASS_CHAOS, QTYPE_TXT, VERSION_BIND_LABELS,
};
use std::fmt;

/// RFC 1035 §4.1.1 message header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl DnsHeader {
    /// Standard query header: no flags set, one question
    pub fn query(id: u16) -> Self {
        Self {
            id,
            question_count: 1,
            ..Self::default()
        }
    }

    /// Append the header in network byte order
    pub fn pack(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.id.to_be_bytes());
        buffer.extend_from_slice(&self.flags.to_be_bytes());
        buffer.extend_from_slice(&self.question_count.to_be_bytes());
        buffer.extend_from_slice(&self.answer_count.to_be_bytes());
        buffer.extend_from_slice(&self.authority_count.to_be_bytes());
        buffer.extend_from_slice(&self.additional_count.to_be_bytes());
    }

    /// Read a header from the start of a message, if it is long enough
    pub fn unpack(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let field = |at: usize| u16::from_be_bytes([bytes[at], bytes[at + 1]]);
        Some(Self {
            id: field(0),
            flags: field(2),
            question_count: field(4),
            answer_count: field(6),
            authority_count: field(8),
            additional_count: field(10),
        })
    }

    pub fn is_response(&self) -> bool {
        self.flags & 0x8000 != 0
    }

    pub fn response_code(&self) -> u8 {
        (self.flags & 0x000F) as u8
    }
}

/// How the transaction ID of a query is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionId {
    Fixed(u16),
    Random,
}

impl TransactionId {
    pub fn resolve(self) -> u16 {
        match self {
            TransactionId::Fixed(id) => id,
            TransactionId::Random => rand::random(),
        }
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        TransactionId::Fixed(DEFAULT_TRANSACTION_ID)
    }
}

/// A complete, immutable `version.bind` TXT/CH request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    bytes: Vec<u8>,
    scrape_offset: usize,
}

impl DnsQuery {
    /// Encode the `version.bind` question with the given transaction ID
    pub fn version_bind(id: u16) -> Self {
        let mut bytes = Vec::with_capacity(HEADER_LEN + 18);
        DnsHeader::query(id).pack(&mut bytes);

        for label in VERSION_BIND_LABELS {
            bytes.push(label.len() as u8);
            bytes.extend_from_slice(label.as_bytes());
        }
        // Replies echo the question; scraping starts at the root label.
        let scrape_offset = bytes.len();
        bytes.push(0);

        bytes.extend_from_slice(&QTYPE_TXT.to_be_bytes());
        bytes.extend_from_slice(&QCLASS_CHAOS.to_be_bytes());

        Self {
            bytes,
            scrape_offset,
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

    pub fn id(&self) -> u16 {
        u16::from_be_bytes([self.bytes[0], self.bytes[1]])
    }

    /// Offset in a reply past the header and the echoed question labels
    pub fn scrape_offset(&self) -> usize {
        self.scrape_offset
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x?}", self.bytes)
    }
}

/// Build the request with the default transaction ID
pub fn build_version_query() -> DnsQuery {
    DnsQuery::version_bind(DEFAULT_TRANSACTION_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_layout() {
        let query = build_version_query();
        let bytes = query.as_bytes();

        assert_eq!(bytes.len(), 30);
        assert_eq!(&bytes[0..2], &[0xC0, 0xDE]);
        assert_eq!(&bytes[2..4], &[0x00, 0x00]);
        assert_eq!(&bytes[4..6], &[0x00, 0x01]);
        assert_eq!(&bytes[6..12], &[0u8; 6]);
        assert_eq!(bytes[12], 7);
        assert_eq!(&bytes[13..20], b"version");
        assert_eq!(bytes[20], 4);
        assert_eq!(&bytes[21..25], b"bind");
        assert_eq!(&bytes[25..27], &[0x00, 0x00]);
        assert_eq!(&bytes[27..29], &[0x10, 0x00]);
        assert_eq!(bytes[29], 0x03);
    }

    #[test]
    fn test_query_is_standard_txt_chaos_question() {
        let query = build_version_query();
        let bytes = query.as_bytes();

        // Root label, then QTYPE and QCLASS as two-octet fields
        assert_eq!(bytes[25], 0);
        assert_eq!(u16::from_be_bytes([bytes[26], bytes[27]]), QTYPE_TXT);
        assert_eq!(u16::from_be_bytes([bytes[28], bytes[29]]), QCLASS_CHAOS);
    }

    #[test]
    fn test_scrape_offset() {
        let query = build_version_query();
        assert_eq!(query.scrape_offset(), 25);
        assert_eq!(query.as_bytes()[query.scrape_offset()], 0);
    }

    #[test]
    fn test_builds_are_identical_past_id() {
        let first = DnsQuery::version_bind(TransactionId::Random.resolve());
        let second = DnsQuery::version_bind(TransactionId::Random.resolve());
        assert_eq!(first.len(), second.len());
        assert_eq!(&first.as_bytes()[2..], &second.as_bytes()[2..]);

        assert_eq!(build_version_query(), build_version_query());
    }

    #[test]
    fn test_explicit_transaction_id() {
        let query = DnsQuery::version_bind(0x1234);
        assert_eq!(query.id(), 0x1234);
        assert_eq!(&query.as_bytes()[0..2], &[0x12, 0x34]);
        assert_eq!(TransactionId::Fixed(7).resolve(), 7);
        assert_eq!(TransactionId::default(), TransactionId::Fixed(0xC0DE));
    }

    #[test]
    fn test_header_round_trip() {
        let header = DnsHeader {
            id: 0xC0DE,
            flags: 0x8405,
            question_count: 1,
            answer_count: 1,
            authority_count: 0,
            additional_count: 0,
        };
        let mut buffer = Vec::new();
        header.pack(&mut buffer);
        assert_eq!(buffer.len(), HEADER_LEN);

        let parsed = DnsHeader::unpack(&buffer).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.is_response());
        assert_eq!(parsed.response_code(), 5);
        assert!(DnsHeader::unpack(&buffer[..11]).is_none());
    }
}
