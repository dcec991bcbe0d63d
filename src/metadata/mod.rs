pub mod client;
pub mod error;
pub mod token_cache;

pub use client::*;
pub use error::*;
pub use token_cache::*;
