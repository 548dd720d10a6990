//! Template helpers
//!
//! Helpers available to every template compiled by [`crate::Compiler`]:
//!
//! | helper            | kind   | example                                   |
//! |-------------------|--------|-------------------------------------------|
//! | `eq` `ne`         | value  | `{{#if (eq kind "lib")}}`                 |
//! | `gt` `gte` `lt` `lte` | value | `{{#if (gt count 1)}}s{{/if}}`         |
//! | `includes`        | value  | `{{#if (includes features "docs")}}`      |
//! | `upper` `lower` `capitalize` | value | `{{upper name}}`             |
//! | `kebab` `pascal` `camel` | value | `{{pascal name}}`                  |
//! | `json`            | value  | `{{json config}}`                         |
//! | `date`            | inline | `{{date "year"}}`                         |
//! | `if-eq`           | block  | `{{#if-eq a b}}..{{else}}..{{/if-eq}}`    |
//! | `if-any`          | block  | `{{#if-any a b c}}..{{/if-any}}`          |
//! | `each-with-index` | block  | `{{#each-with-index items}}{{index}}{{/each-with-index}}` |
//!
//! String helpers sanitize their input and render nothing when it is
//! rejected. Unknown placeholders are re-emitted verbatim by the
//! `helperMissing` hook so a template can be rendered in several passes.
//! Hash arguments come back in key order. Bare triple-stash placeholders
//! (`{{{path}}}`) bypass that hook, so `guard_triple_stash` rewrites them
//! into a helper call before the template is parsed.

use std::borrow::Cow;
use std::cmp::Ordering;

use handlebars::{
    BlockContext, Context, Handlebars, Helper, HelperDef, HelperResult, JsonRender, Output,
    PathAndJson, RenderContext, RenderErrorReason, Renderable, to_json,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value as Json};

use stencil_core::sanitize::{sanitize_text, sanitize_value};

/// Register every Stencil helper into `registry`.
///
/// Registering replaces helpers of the same name, so calling this twice
/// leaves the registry in the same state as calling it once.
pub fn register_helpers(registry: &mut Handlebars<'_>) {
    registry.register_helper("eq", Box::new(value::eq));
    registry.register_helper("ne", Box::new(value::ne));
    registry.register_helper("gt", Box::new(value::gt));
    registry.register_helper("gte", Box::new(value::gte));
    registry.register_helper("lt", Box::new(value::lt));
    registry.register_helper("lte", Box::new(value::lte));
    registry.register_helper("includes", Box::new(value::includes));

    registry.register_helper("upper", Box::new(value::upper));
    registry.register_helper("lower", Box::new(value::lower));
    registry.register_helper("capitalize", Box::new(value::capitalize));
    registry.register_helper("kebab", Box::new(value::kebab));
    registry.register_helper("pascal", Box::new(value::pascal));
    registry.register_helper("camel", Box::new(value::camel));

    registry.register_helper("json", Box::new(value::json));
    registry.register_helper("date", Box::new(date_helper));

    registry.register_helper("if-eq", Box::new(IfEqHelper));
    registry.register_helper("if-any", Box::new(IfAnyHelper));
    registry.register_helper("each-with-index", Box::new(EachWithIndexHelper));

    registry.register_helper(RAW_PLACEHOLDER, Box::new(raw_placeholder));
    registry.register_helper("helperMissing", Box::new(verbatim_missing));
}

/// Names registered by [`register_helpers`], other than the hooks
const HELPER_NAMES: &[&str] = &[
    "eq",
    "ne",
    "gt",
    "gte",
    "lt",
    "lte",
    "includes",
    "upper",
    "lower",
    "capitalize",
    "kebab",
    "pascal",
    "camel",
    "json",
    "date",
    "if-eq",
    "if-any",
    "each-with-index",
];

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

fn compare(a: &Json, b: &Json) -> Option<Ordering> {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Json::String(x), Json::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn loosely_equal(a: &Json, b: &Json) -> bool {
    compare(a, b).map_or(a == b, |ord| ord == Ordering::Equal)
}

// ---------------------------------------------------------------------------
// String case
// ---------------------------------------------------------------------------

fn convert_case(value: &Json, convert: impl Fn(&str) -> String) -> String {
    let text = match value {
        Json::Null => return String::new(),
        Json::String(text) => text.clone(),
        other => other.render(),
    };
    sanitize_text(&text)
        .map(|clean| convert(&clean))
        .unwrap_or_default()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Serialization and dates
// ---------------------------------------------------------------------------

fn to_sanitized_json(value: &Json) -> String {
    sanitize_value(value)
        .ok()
        .and_then(|clean| serde_json::to_string(&clean).ok())
        .unwrap_or_else(|| "{}".to_string())
}

/// Helpers generated by `handlebars_helper!`
mod value {
    use std::cmp::Ordering;

    use handlebars::handlebars_helper;
    use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase};
    use serde_json::Value as Json;

    use super::{capitalize_first, compare, convert_case, loosely_equal, to_sanitized_json};

    handlebars_helper!(eq: |a: Json, b: Json| loosely_equal(a, b));
    handlebars_helper!(ne: |a: Json, b: Json| !loosely_equal(a, b));
    handlebars_helper!(gt: |a: Json, b: Json| compare(a, b) == Some(Ordering::Greater));
    handlebars_helper!(gte: |a: Json, b: Json| matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal)));
    handlebars_helper!(lt: |a: Json, b: Json| compare(a, b) == Some(Ordering::Less));
    handlebars_helper!(lte: |a: Json, b: Json| matches!(compare(a, b), Some(Ordering::Less | Ordering::Equal)));
    handlebars_helper!(includes: |list: Json, item: Json| {
        list.as_array()
            .is_some_and(|items| items.iter().any(|candidate| loosely_equal(candidate, item)))
    });

    handlebars_helper!(upper: |v: Json| convert_case(v, str::to_uppercase));
    handlebars_helper!(lower: |v: Json| convert_case(v, str::to_lowercase));
    handlebars_helper!(capitalize: |v: Json| convert_case(v, capitalize_first));
    handlebars_helper!(kebab: |v: Json| convert_case(v, |s| s.to_kebab_case()));
    handlebars_helper!(pascal: |v: Json| convert_case(v, |s| s.to_pascal_case()));
    handlebars_helper!(camel: |v: Json| convert_case(v, |s| s.to_lower_camel_case()));

    handlebars_helper!(json: |v: Json| to_sanitized_json(v));
}

/// Format the current date: `iso` (default), `year` or `locale`
pub fn format_date<Tz>(now: chrono::DateTime<Tz>, style: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match style {
        "year" => now.format("%Y").to_string(),
        "locale" => now.format("%B %-d, %Y").to_string(),
        _ => now.to_rfc3339(),
    }
}

fn date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let style = h
        .param(0)
        .and_then(|p| p.value().as_str())
        .unwrap_or("iso");
    out.write(&format_date(chrono::Local::now(), style))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Missing placeholders
// ---------------------------------------------------------------------------

fn verbatim_missing(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let mut placeholder = format!("{{{{{}", h.name());
    for param in h.params() {
        placeholder.push(' ');
        placeholder.push_str(&argument_text(param));
    }
    for (key, value) in h.hash() {
        placeholder.push_str(&format!(" {}={}", key, argument_text(value)));
    }
    placeholder.push_str("}}");
    out.write(&placeholder)?;
    Ok(())
}

/// Argument as written: the path for lookups, JSON for literals
fn argument_text(arg: &PathAndJson) -> String {
    match arg.relative_path() {
        Some(path) => path.clone(),
        None => arg.value().to_string(),
    }
}

/// Helper standing in for a bare `{{{path}}}` placeholder
const RAW_PLACEHOLDER: &str = "raw-placeholder";

static TRIPLE_STASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\{+)(\s*)([A-Za-z_@.][\w.@/-]*)(\s*)(\}+)").expect("valid regex")
});

/// Rewrite `{{{path}}}` into `{{{raw-placeholder path}}}`.
///
/// Raw blocks (`{{{{raw}}}}`), plain expressions and helper calls are left
/// alone.
pub(crate) fn guard_triple_stash(source: &str) -> Cow<'_, str> {
    TRIPLE_STASH.replace_all(source, |caps: &Captures| {
        let path = &caps[3];
        if caps[1].len() == 3 && caps[5].len() == 3 && !HELPER_NAMES.contains(&path) {
            ["{{{", RAW_PLACEHOLDER, " ", path, "}}}"].concat()
        } else {
            caps[0].to_string()
        }
    })
}

fn raw_placeholder(
    h: &Helper,
    r: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let Some(param) = h.param(0) else {
        return Ok(());
    };
    if !param.is_value_missing() {
        out.write(&param.value().render())?;
        return Ok(());
    }

    let path = argument_text(param);
    if r.strict_mode() {
        return Err(RenderErrorReason::MissingVariable(Some(path)).into());
    }
    out.write(&["{{{", &path, "}}}"].concat())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Block helpers
// ---------------------------------------------------------------------------

fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Json::String(s) => !s.is_empty(),
        Json::Array(items) => !items.is_empty(),
        Json::Object(_) => true,
    }
}

/// `{{#if-eq a b}}` renders its body when both params are equal
struct IfEqHelper;

impl HelperDef for IfEqHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let matched = match (h.param(0), h.param(1)) {
            (Some(a), Some(b)) => loosely_equal(a.value(), b.value()),
            _ => false,
        };
        let branch = if matched { h.template() } else { h.inverse() };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// `{{#if-any a b ...}}` renders its body when any param is truthy
struct IfAnyHelper;

impl HelperDef for IfAnyHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let matched = h.params().iter().any(|p| is_truthy(p.value()));
        let branch = if matched { h.template() } else { h.inverse() };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// `{{#each-with-index items}}` iterates an array exposing `index`,
/// `isFirst` and `isLast` next to the item's own fields
struct EachWithIndexHelper;

impl HelperDef for EachWithIndexHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let items = h
            .param(0)
            .and_then(|p| p.value().as_array())
            .filter(|items| !items.is_empty());

        let (Some(items), Some(template)) = (items, h.template()) else {
            return match h.inverse() {
                Some(t) => t.render(r, ctx, rc, out),
                None => Ok(()),
            };
        };

        let last = items.len() - 1;
        for (index, item) in items.iter().enumerate() {
            let mut block = BlockContext::new();
            block.set_base_value(indexed_item(item, index, last));
            block.set_local_var("index", to_json(index));
            block.set_local_var("first", to_json(index == 0));
            block.set_local_var("last", to_json(index == last));
            rc.push_block(block);
            let rendered = template.render(r, ctx, rc, out);
            rc.pop_block();
            rendered?;
        }
        Ok(())
    }
}

fn indexed_item(item: &Json, index: usize, last: usize) -> Json {
    match item {
        Json::Object(fields) => {
            let mut merged: Map<String, Json> = fields.clone();
            merged.insert("index".to_string(), Json::from(index));
            merged.insert("isFirst".to_string(), Json::Bool(index == 0));
            merged.insert("isLast".to_string(), Json::Bool(index == last));
            Json::Object(merged)
        }
        other => other.clone(),
    }
}
