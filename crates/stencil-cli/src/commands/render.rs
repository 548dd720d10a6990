//! Render a single template

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use stencil_template::{CompileOptions, Compiler};

/// Run the render command
pub async fn run(
    config_path: &str,
    template: &str,
    context_file: Option<&str>,
    assignments: &[String],
    output: Option<&str>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let context = build_context(context_file, assignments)?;

    let mut compiler = Compiler::new(CompileOptions::from(&config.project.templates)).initialize();
    let rendered = compiler
        .compile(template, &context)
        .await
        .with_context(|| format!("Failed to render {}", template))?;

    match output {
        Some(path) => {
            // output paths may use placeholders too, e.g. `src/{{name}}.tsx`
            let path = compiler
                .compile_str(path, &context)
                .with_context(|| format!("Invalid output path {}", path))?;
            std::fs::write(&path, &rendered).with_context(|| format!("Failed to write {}", path))?;
            tracing::info!("Rendered {} -> {}", template, path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Build the context from an optional JSON file plus `key=value` overrides
fn build_context(context_file: Option<&str>, assignments: &[String]) -> Result<Value> {
    let mut context = match context_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context file {}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Context file {} is not valid JSON", path))?
        }
        None => Value::Object(Map::new()),
    };

    for assignment in assignments {
        let Some((key, raw)) = assignment.split_once('=') else {
            bail!("Invalid --set value '{}': expected KEY=VALUE", assignment);
        };
        set_path(&mut context, key, parse_scalar(raw))?;
    }

    Ok(context)
}

/// JSON literal when it parses as one, otherwise a plain string
fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Assign `value` at a dotted key, creating objects along the way
fn set_path(context: &mut Value, key: &str, value: Value) -> Result<()> {
    let mut segments = key.split('.').peekable();
    let mut current = context;

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            bail!("Invalid context key '{}'", key);
        }
        let Value::Object(map) = current else {
            bail!("Cannot set '{}': parent is not an object", key);
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(())
}
