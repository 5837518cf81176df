#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/comps/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod peers;
pub mod pipeline;

// Re-export main types from sub-crates
pub use comps_data as data;
pub use comps_output as output;
pub use comps_valuation as valuation;

pub use config::CompsConfig;
pub use error::{CompanyError, CompsError, Result};
pub use peers::{Industry, PeerGroup, default_peers, peer_options, suggested_peers};
pub use pipeline::{CompsPipeline, PipelineOptions, PipelineReport};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
