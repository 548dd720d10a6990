//! Restore line breaks in collapsed templates

use anyhow::{Context, Result, bail};
use stencil_template::format::format_templates_in;

/// Run the fmt-templates command
pub async fn run(config_path: &str, dir: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let dir = super::template_dir(&config, dir);
    if !dir.is_dir() {
        bail!("Template directory not found: {}", dir.display());
    }

    let fixed = format_templates_in(&dir)
        .with_context(|| format!("Failed to format templates in {}", dir.display()))?;
    println!("Fixed {} template(s)", fixed.len());

    Ok(())
}
