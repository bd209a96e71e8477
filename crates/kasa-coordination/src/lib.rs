pub mod dispatcher;
pub mod response;
pub mod trigger;

pub use dispatcher::*;
pub use response::*;
pub use trigger::*;
