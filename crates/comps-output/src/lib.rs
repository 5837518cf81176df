#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/comps/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod format;
pub mod report;
pub mod summary;

pub use export::{ComparableRow, ExportError, ExportFormat, Exporter, default_filename};
pub use report::{CompsReport, FailedCompany};
pub use summary::{MultipleStats, PeerSummary, generate_peer_summary};
