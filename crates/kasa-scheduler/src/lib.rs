pub mod daily;
pub mod notifier;

pub use daily::*;
pub use notifier::*;
