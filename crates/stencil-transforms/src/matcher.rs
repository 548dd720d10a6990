//! Call and argument matching for class name ordering
//!
//! A class-merging call looks like `cn('base', variant, className)`. Any
//! argument that is a bare identifier named `className`, optionally followed
//! by digits, is caller-supplied and has to come last so it wins conflicts
//! against the component's own classes.

use once_cell::sync::Lazy;
use regex::Regex;
use swc_core::ecma::ast::{CallExpr, Callee, Expr, ExprOrSpread};

static CLASS_NAME_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^className\d*$").expect("valid regex"));

/// Role of one call argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Caller-supplied class name identifier
    ClassName,
    /// Anything else
    Other,
}

/// Argument indices split by role, each group in original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Non-className arguments
    pub others: Vec<usize>,
    /// className arguments
    pub class_names: Vec<usize>,
}

impl Partition {
    /// True when no className argument precedes a non-className one
    pub fn is_ordered(&self) -> bool {
        match (self.others.last(), self.class_names.first()) {
            (Some(last_other), Some(first_class)) => last_other < first_class,
            _ => true,
        }
    }

    /// Original argument indices in their target order
    pub fn target_order(&self) -> Vec<usize> {
        self.others
            .iter()
            .chain(self.class_names.iter())
            .copied()
            .collect()
    }
}

/// Whether `call` invokes the plain identifier `name`
pub fn is_target_call(call: &CallExpr, name: &str) -> bool {
    match &call.callee {
        Callee::Expr(expr) => matches!(&**expr, Expr::Ident(ident) if &*ident.sym == name),
        _ => false,
    }
}

/// Whether an identifier name is a className name
pub fn is_class_name(name: &str) -> bool {
    CLASS_NAME_IDENT.is_match(name)
}

/// Classify one argument. Spread arguments are never className.
pub fn classify(arg: &ExprOrSpread) -> ArgKind {
    if arg.spread.is_some() {
        return ArgKind::Other;
    }
    match &*arg.expr {
        Expr::Ident(ident) if is_class_name(&ident.sym) => ArgKind::ClassName,
        _ => ArgKind::Other,
    }
}

/// Split call arguments into others and className, preserving order
pub fn partition(args: &[ExprOrSpread]) -> Partition {
    let mut partition = Partition::default();
    for (index, arg) in args.iter().enumerate() {
        match classify(arg) {
            ArgKind::ClassName => partition.class_names.push(index),
            ArgKind::Other => partition.others.push(index),
        }
    }
    partition
}
