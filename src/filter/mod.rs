pub mod types;
pub mod filter;
pub mod filter_order;
pub mod registry;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use error::FilterError;
