pub mod export;
pub mod report;
pub mod resolver;

pub use export::*;
pub use report::*;
pub use resolver::*;
