pub mod contract;
pub mod error;
pub mod record;

pub use contract::*;
pub use error::*;
pub use record::*;
