pub mod invalidation;
pub mod keys;
pub mod store;

pub use invalidation::*;
pub use keys::*;
pub use store::*;
