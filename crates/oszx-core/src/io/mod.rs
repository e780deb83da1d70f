//! I/O utilities for archive access.

pub mod shared;

pub use shared::SharedFile;
