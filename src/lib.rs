//! Catalog linking library - shared modules for all binaries.

pub mod community;
pub mod diagnostics;
pub mod index;
pub mod models;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod resolve;
pub mod romanize;
pub mod safety;
pub mod sources;
pub mod special;
pub mod variant;
