//! Core definitions (error taxonomy and `Result`), relied upon by all
//! softquad-* crates.

pub mod error;
pub mod result;

pub use result::Result;
