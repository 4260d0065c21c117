//! Reporting core: filter normalization, typed aggregation over one filtered
//! snapshot, and the assembler that bundles views per endpoint.

pub mod assembler;
pub mod engine;
pub mod filter;
pub mod pipeline;
pub mod questions;
pub mod types;

pub use assembler::{ReportAssembler, ReportError, ReportKind, ReportResult};
pub use filter::FilterParams;
