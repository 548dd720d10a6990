//! Stencil Template Compiler
//!
//! This crate compiles Handlebars templates into reusable render functions
//! and keeps them in a bounded, modification-time validated cache.
//!
//! # Pipeline Overview
//!
//! ```text
//! ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐
//! │ Template │────▶│  Cache   │────▶│ Sanitize │────▶│  Render  │
//! │  (.hbs)  │     │ (mtime)  │     │ Context  │     │          │
//! └──────────┘     └──────────┘     └──────────┘     └──────────┘
//! ```
//!
//! Compilation is cached because parsing is the expensive step; the
//! context is sanitized fresh on every render because the same template
//! is rendered with many untrusted contexts.
//!
//! # Example
//!
//! ```rust,ignore
//! use stencil_template::{CompileOptions, Compiler};
//! use serde_json::json;
//!
//! let mut compiler = Compiler::new(CompileOptions::default()).initialize();
//! let text = compiler.compile("templates/README.md.hbs", &json!({"name": "demo"})).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod compiler;
pub mod error;
pub mod format;
pub mod fs;
pub mod helpers;

pub use cache::{CacheEntry, CacheStats, TemplateCache};
pub use compiler::{CompileOptions, CompiledTemplate, Compiler, PrecompileReport};
pub use error::{Error, Result};
pub use fs::{TemplateFs, TokioFs};
