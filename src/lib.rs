// Public library interface for batview-rs
// The viewer shell and the diagnostic tools build on these modules

pub mod app;
pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod tree;

pub use error::{Result, ViewerError};
