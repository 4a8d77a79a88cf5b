//! Bookshelf application library
//!
//! Wires the books module into the kernel, database and HTTP crates.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{migrate, serve};
