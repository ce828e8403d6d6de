//! # Gridiron Development Tools
//!
//! Command-line tools for development:
//! - Playbook data validators
//! - Built-in playbook export

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
