//! Warm the template cache

use anyhow::{Context, Result, bail};
use serde_json::json;
use stencil_template::{CompileOptions, Compiler};

/// Run the precompile command
pub async fn run(config_path: &str, dir: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let dir = super::template_dir(&config, dir);
    if !dir.is_dir() {
        bail!("Template directory not found: {}", dir.display());
    }

    tracing::info!("Precompiling templates in {}", dir.display());
    let mut compiler = Compiler::new(CompileOptions::from(&config.project.templates)).initialize();
    let report = compiler
        .precompile_dir(&dir)
        .await
        .context("Precompile failed")?;

    for path in &report.skipped {
        tracing::warn!("  ✗ {}", path.display());
    }

    let summary = json!({
        "compiled": report.compiled.len(),
        "skipped": report.skipped,
        "cache": compiler.cache_stats(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
