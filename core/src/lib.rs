#![no_std]

extern crate alloc;

pub use board::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use snapshot::*;
pub use types::*;

mod board;
mod config;
mod engine;
mod error;
mod generator;
mod session;
mod snapshot;
mod types;
