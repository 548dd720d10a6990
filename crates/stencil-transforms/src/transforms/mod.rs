//! Source transforms
//!
//! A transform takes source text and returns rewritten text. Transforms are
//! best-effort: a transform that cannot handle its input reports why in
//! `warnings` and hands back the input unchanged. Only [`Transform::rewrite`]
//! returns errors; [`Transform::apply`] never does.

mod class_name_order;

pub use class_name_order::{ClassNameOrder, DEFAULT_TARGET_FN};

use std::panic::{self, AssertUnwindSafe};

use crate::error::Result;

/// Output of one transform over one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Resulting source text
    pub content: String,
    /// Whether `content` differs from the input
    pub changed: bool,
    /// One message per rewrite performed, or per reason the input was skipped
    pub warnings: Vec<String>,
}

impl TransformResult {
    /// Input returned as-is
    pub fn unchanged(source: &str) -> Self {
        Self {
            content: source.to_string(),
            changed: false,
            warnings: Vec::new(),
        }
    }

    /// Input returned as-is with a reason
    pub fn skipped(source: &str, warning: impl Into<String>) -> Self {
        Self {
            warnings: vec![warning.into()],
            ..Self::unchanged(source)
        }
    }
}

/// A source-to-source rewrite
pub trait Transform: Send + Sync {
    /// Short name used in reports
    fn name(&self) -> &str;

    /// Rewrite `source`, failing if it cannot be processed
    fn rewrite(&self, source: &str) -> Result<TransformResult>;

    /// Rewrite `source`, falling back to the input on any failure
    fn apply(&self, source: &str) -> TransformResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.rewrite(source))) {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::debug!("{} skipped: {}", self.name(), e);
                TransformResult::skipped(source, format!("Skipped {}: {}", self.name(), e))
            }
            Err(_) => {
                tracing::warn!("{} panicked; source left unchanged", self.name());
                TransformResult::skipped(
                    source,
                    format!("Skipped {}: internal error", self.name()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Failing;

    impl Transform for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn rewrite(&self, _source: &str) -> Result<TransformResult> {
            Err(Error::Parse {
                message: "boom".to_string(),
            })
        }
    }

    struct Panicking;

    impl Transform for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn rewrite(&self, _source: &str) -> Result<TransformResult> {
            panic!("unexpected node")
        }
    }

    #[test]
    fn test_apply_folds_errors_into_warnings() {
        let result = Failing.apply("const a = 1;");
        assert_eq!(result.content, "const a = 1;");
        assert!(!result.changed);
        assert_eq!(result.warnings, vec!["Skipped failing: parse error: boom"]);
    }

    #[test]
    fn test_apply_survives_panics() {
        let result = Panicking.apply("x");
        assert_eq!(result.content, "x");
        assert!(!result.changed);
        assert_eq!(result.warnings, vec!["Skipped panicking: internal error"]);
    }
}
