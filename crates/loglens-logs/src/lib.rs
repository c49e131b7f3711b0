//! LogLens Logs - Log file access, host log sinks and client log ingestion

mod access;
mod format;
mod ingest;
pub mod mock;
mod sinks;

pub use access::FileAccess;
pub use format::{format_line, level_from_tracing, parse_level_prefix, LensFormat, SEVERITY_FIELD};
pub use ingest::{
    client_severity, ClientLogIngest, ClientLogPayload, ClientSink, RejectReason, Submission,
    TracingSink,
};
pub use sinks::{build_host_sinks, level_filter, BoxedLayer, HostSinks};
