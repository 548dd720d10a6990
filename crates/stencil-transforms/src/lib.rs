//! Stencil Source Transforms
//!
//! Mechanical rewrites of TypeScript/JSX source, driven by the syntax tree.
//!
//! # Pipeline Overview
//!
//! ```text
//! ┌─────────┐     ┌─────────┐     ┌─────────┐     ┌─────────┐
//! │ Source  │────▶│   AST   │────▶│  Match  │────▶│ Splice  │
//! │  Text   │     │ (Parse) │     │ (Visit) │     │ (Spans) │
//! └─────────┘     └─────────┘     └─────────┘     └─────────┘
//! ```
//!
//! Rewrites are applied by splicing the original source text at the spans
//! of the matched nodes, so code outside a match is never reformatted.
//! Transforms are best-effort: input that cannot be parsed comes back
//! unchanged with a warning.
//!
//! # Example
//!
//! ```rust,ignore
//! use stencil_transforms::{ClassNameOrder, Transform};
//!
//! let result = ClassNameOrder::default().apply("cn(className, 'a', 'b')");
//! assert_eq!(result.content, "cn('a', 'b', className)");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod matcher;
pub mod parse;
pub mod pipeline;
pub mod transforms;

pub use error::{Error, Result};
pub use pipeline::{FileReport, Pipeline, PipelineResult};
pub use transforms::{ClassNameOrder, Transform, TransformResult};
