pub mod memory;
pub mod snapshot;
pub mod state;
pub mod store;

pub use memory::*;
pub use snapshot::*;
pub use state::*;
pub use store::*;
