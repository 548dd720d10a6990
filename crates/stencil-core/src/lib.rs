//! Stencil Core Library
//!
//! This crate provides the pieces shared by every Stencil tool:
//! - Sanitization of untrusted text before it is written into generated files
//! - Project configuration parsing (`stencil.yaml`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Context   │────▶│  Sanitizer  │────▶│  Template   │
//! │   (JSON)    │     │  (strip)    │     │  Renderer   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use stencil_core::sanitize::sanitize_text;
//!
//! let clean = sanitize_text("hello\u{0}\u{1}world").unwrap();
//! assert_eq!(clean, "helloworld");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod sanitize;

pub use config::{Config, ProjectConfig};
pub use error::{Error, Result, TextRejection};
pub use sanitize::{MAX_TEXT_LENGTH, sanitize_template_context, sanitize_text, sanitize_value};
