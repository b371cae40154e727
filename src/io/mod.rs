//! Input/output adapters.
//!
//! - CSV ingest of historical sales (`ingest`)
//! - forecast exports (CSV/JSON) and history CSV (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
