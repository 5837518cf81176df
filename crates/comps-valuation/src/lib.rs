#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/comps/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod multiples;
pub mod record;
pub mod registry;

pub use error::{DivisionError, ExtractionError, ValuationError};
pub use extract::{StructuredExtractor, record_from_facts};
pub use multiples::{ComparableEntry, Multiple};
pub use record::{ExtractionSource, FinancialRecord};

// Re-export registry types for convenience
pub use registry::{
    MultipleFormat, MultipleInfo, MultipleKind, available_multiples, get_multiple_info,
    multiple_by_name,
};
