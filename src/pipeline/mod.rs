//! Pipeline module - loading, reshaping, cleaning and aggregating the indicator tables

pub mod cleaning;
pub mod correlation;
pub mod indicator;
pub mod loader;
pub mod output;
pub mod record;
pub mod reshape;
pub mod rolling;
pub mod value;

pub use cleaning::*;
pub use correlation::*;
pub use indicator::*;
pub use loader::*;
pub use output::*;
pub use record::*;
pub use reshape::*;
pub use rolling::*;
pub use value::*;
