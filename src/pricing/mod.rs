pub mod client;
pub mod consumer;
pub mod error;
pub mod handlers;
pub mod queue;
pub mod scheduler;
pub mod service;

pub use client::*;
pub use consumer::*;
pub use error::*;
pub use handlers::*;
pub use queue::*;
pub use scheduler::*;
pub use service::*;
