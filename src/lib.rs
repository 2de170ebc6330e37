pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod probe;
pub mod query;
pub mod reply;
pub mod transport;

pub use config::Config;
pub use errors::{ProbeError, Result};
pub use probe::{query_version, VersionProbe};
pub use query::{build_version_query, DnsQuery, TransactionId};
pub use reply::{extract_version, DnsReply};
