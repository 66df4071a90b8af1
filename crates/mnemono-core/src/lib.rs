pub mod allocator;
pub mod commands;
pub mod config;
pub mod cycle;
pub mod error;
pub mod io;
pub mod paths;
pub mod stage;
pub mod store;

pub use error::{MnemonoError, Result};
