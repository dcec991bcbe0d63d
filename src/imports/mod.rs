pub mod client;
pub mod handlers;
pub mod service;

pub use client::*;
pub use handlers::*;
pub use service::*;
