//! Cross-cutting helpers shared by the service crate and the binary:
//! tracing setup and operation counters.

pub mod metrics;
pub mod utils;
