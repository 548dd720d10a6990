//! Move `className` arguments to the end of `cn()` calls
//!
//! Class-merging helpers resolve conflicts in favor of later arguments, so
//! a caller's `className` only overrides component defaults when it comes
//! last. Generated components sometimes get this backwards:
//!
//! ```text
//! cn(className, 'px-4 py-2', variant)   =>   cn('px-4 py-2', variant, className)
//! ```
//!
//! Arguments are moved as source text. Separators and comments between
//! arguments stay where they were, and nothing outside a rewritten call is
//! touched.

use swc_core::common::Spanned;
use swc_core::ecma::ast::{CallExpr, ExprOrSpread};
use swc_core::ecma::visit::{Visit, VisitWith};

use super::{Transform, TransformResult};
use crate::error::Result;
use crate::matcher::{is_target_call, partition};
use crate::parse::{ParsedSource, line_of, parse_tsx};

/// Default class-merging function name
pub const DEFAULT_TARGET_FN: &str = "cn";

/// Reorders arguments of calls to a class-merging function
#[derive(Debug, Clone)]
pub struct ClassNameOrder {
    target_fn: String,
}

impl ClassNameOrder {
    /// Target calls to `target_fn` instead of `cn`
    pub fn new(target_fn: impl Into<String>) -> Self {
        Self {
            target_fn: target_fn.into(),
        }
    }

    /// Name of the function whose calls are rewritten
    pub fn target_fn(&self) -> &str {
        &self.target_fn
    }
}

impl Default for ClassNameOrder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FN)
    }
}

impl Transform for ClassNameOrder {
    fn name(&self) -> &str {
        "class-name-order"
    }

    fn rewrite(&self, source: &str) -> Result<TransformResult> {
        let parsed = parse_tsx(source)?;

        let mut collector = CallCollector {
            target_fn: &self.target_fn,
            parsed: &parsed,
            edits: Vec::new(),
        };
        parsed.module.visit_with(&mut collector);

        let mut edits = collector.edits;
        if edits.is_empty() {
            return Ok(TransformResult::unchanged(source));
        }
        edits.sort_by_key(|edit| edit.start());

        let warnings = edits
            .iter()
            .map(|edit| {
                format!(
                    "Reordered {}() arguments at line {}: className arguments moved last",
                    self.target_fn,
                    line_of(source, edit.start())
                )
            })
            .collect();

        let content = Splicer {
            source,
            edits: &edits,
        }
        .splice(0, source.len());
        tracing::debug!("Reordered {} {}() call(s)", edits.len(), self.target_fn);

        Ok(TransformResult {
            changed: content != source,
            content,
            warnings,
        })
    }
}

/// One call whose arguments need to move
struct Reorder {
    /// Byte range of each argument, in source order
    slots: Vec<(usize, usize)>,
    /// For each slot, the index of the argument that should end up there
    order: Vec<usize>,
}

impl Reorder {
    fn start(&self) -> usize {
        self.slots[0].0
    }

    fn end(&self) -> usize {
        self.slots[self.slots.len() - 1].1
    }
}

struct CallCollector<'a> {
    target_fn: &'a str,
    parsed: &'a ParsedSource,
    edits: Vec<Reorder>,
}

impl CallCollector<'_> {
    fn arg_range(&self, arg: &ExprOrSpread) -> (usize, usize) {
        let lo = arg.spread.map_or_else(|| arg.expr.span_lo(), |spread| spread.lo);
        (self.parsed.offset(lo), self.parsed.offset(arg.expr.span_hi()))
    }
}

impl Visit for CallCollector<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if is_target_call(call, self.target_fn) && call.args.len() > 1 {
            let split = partition(&call.args);
            if !split.is_ordered() {
                self.edits.push(Reorder {
                    slots: call.args.iter().map(|arg| self.arg_range(arg)).collect(),
                    order: split.target_order(),
                });
            }
        }
        call.visit_children_with(self);
    }
}

/// Rebuilds source text with every [`Reorder`] applied, innermost first
struct Splicer<'a> {
    source: &'a str,
    edits: &'a [Reorder],
}

impl Splicer<'_> {
    /// Rewritten text of `source[start..end]`
    fn splice(&self, start: usize, end: usize) -> String {
        let mut out = String::with_capacity(end - start);
        let mut cursor = start;

        for edit in self.edits {
            // nested in an edit already emitted, or outside this range
            if edit.start() < cursor || edit.end() > end {
                continue;
            }

            out.push_str(&self.source[cursor..edit.start()]);
            for (slot, &(slot_start, _)) in edit.slots.iter().enumerate() {
                if slot > 0 {
                    let previous_end = edit.slots[slot - 1].1;
                    out.push_str(&self.source[previous_end..slot_start]);
                }
                let (from, to) = edit.slots[edit.order[slot]];
                out.push_str(&self.splice(from, to));
            }
            cursor = edit.end();
        }

        out.push_str(&self.source[cursor..end]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn apply(source: &str) -> TransformResult {
        ClassNameOrder::default().apply(source)
    }

    #[test]
    fn test_moves_class_name_last() {
        let result = apply("cn(className, 'a', 'b')");
        assert_eq!(result.content, "cn('a', 'b', className)");
        assert!(result.changed);
        assert_eq!(
            result.warnings,
            vec!["Reordered cn() arguments at line 1: className arguments moved last"]
        );
    }

    #[test]
    fn test_keeps_relative_order_within_groups() {
        let result = apply("cn(a, className, b, className2)");
        assert_eq!(result.content, "cn(a, b, className, className2)");
    }

    #[rstest]
    #[case("cn('a', 'b', className)")]
    #[case("cn(className)")]
    #[case("cn()")]
    #[case("cn('a', props.className)")]
    #[case("clsx(className, 'a')")]
    #[case("utils.cn(className, 'a')")]
    #[case("cn(...className, 'a')")]
    fn test_leaves_call_alone(#[case] source: &str) {
        let result = apply(source);
        assert_eq!(result.content, source);
        assert!(!result.changed);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_untouched_source_is_byte_identical() {
        let source = "import {cn} from './utils'\n\n\nexport   const x = cn(  'a',\n    b  )  // keep\n";
        let result = apply(source);
        assert_eq!(result.content, source);
        assert!(!result.changed);
    }

    #[test]
    fn test_keeps_leading_bom() {
        let result = apply("\u{feff}const x = cn(className, 'a');\n");
        assert_eq!(result.content, "\u{feff}const x = cn('a', className);\n");
        assert!(result.changed);

        let untouched = "\u{feff}const y = cn('a', className);\n";
        let result = apply(untouched);
        assert_eq!(result.content, untouched);
        assert!(!result.changed);
    }

    #[test]
    fn test_is_idempotent() {
        let once = apply("const c = cn(className, 'a', cn(className2, 'b'));");
        let twice = apply(&once.content);
        assert_eq!(twice.content, once.content);
        assert!(!twice.changed);
        assert!(twice.warnings.is_empty());
    }

    #[test]
    fn test_rewrites_nested_calls() {
        let result = apply("cn(className, cn(className2, 'b'), 'a')");
        assert_eq!(result.content, "cn(cn('b', className2), 'a', className)");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_preserves_comments_and_layout() {
        let source = "cn(\n  className, // caller\n  'px-4',\n  /* size */ size,\n)";
        let result = apply(source);
        assert_eq!(
            result.content,
            "cn(\n  'px-4', // caller\n  size,\n  /* size */ className,\n)"
        );
    }

    #[test]
    fn test_rewrites_inside_jsx() {
        let source = r#"export function Button({ className, ...props }: Props) {
  return <button className={cn(className, "inline-flex", props.size)} {...props} />;
}
"#;
        let result = apply(source);
        assert!(result.changed);
        assert!(
            result
                .content
                .contains(r#"className={cn("inline-flex", props.size, className)}"#)
        );
        assert_eq!(
            result.warnings,
            vec!["Reordered cn() arguments at line 2: className arguments moved last"]
        );
    }

    #[test]
    fn test_custom_target_fn() {
        let transform = ClassNameOrder::new("clsx");
        let result = transform.apply("clsx(className, 'a'); cn(className, 'b');");
        assert_eq!(result.content, "clsx('a', className); cn(className, 'b');");
        assert_eq!(
            result.warnings,
            vec!["Reordered clsx() arguments at line 1: className arguments moved last"]
        );
    }

    #[test]
    fn test_parse_error_returns_input() {
        let source = "export const = cn(className, 'a'";
        let result = apply(source);
        assert_eq!(result.content, source);
        assert!(!result.changed);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Skipped class-name-order: parse error"));
    }

    #[test]
    fn test_reports_each_call_line() {
        let source = "const a = cn('x', y);\nconst b = cn(className, 'x');\n\nconst c = cn(className, 'z');\n";
        let result = apply(source);
        assert_eq!(
            result.warnings,
            vec![
                "Reordered cn() arguments at line 2: className arguments moved last",
                "Reordered cn() arguments at line 4: className arguments moved last",
            ]
        );
    }
}
