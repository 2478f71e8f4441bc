//! Report module - summarizing pipeline results

pub mod correlation_table;
pub mod export;
pub mod summary;

pub use correlation_table::*;
pub use export::*;
pub use summary::*;
