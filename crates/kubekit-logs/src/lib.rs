//! Log streaming for kubekit
//!
//! Fetches a container's logs and writes them line by line, prefixing the
//! container name for multi-container pods.

mod stream;

pub use stream::{LogOptions, format_line, stream_pod_logs, write_lines};
