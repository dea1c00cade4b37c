//! The two network phases and their shared plumbing.

pub mod assets;
pub mod fetch;
pub mod http;
pub mod retry;
