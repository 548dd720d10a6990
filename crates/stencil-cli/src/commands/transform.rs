//! Reorder className arguments in component source

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stencil_transforms::{FileReport, Pipeline};

/// Run the transform command
pub async fn run(
    config_path: &str,
    paths: &[String],
    write: bool,
    target_fn: Option<&str>,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let settings = &config.project.transforms;
    let pipeline = Pipeline::with_defaults(target_fn.unwrap_or(&settings.target_fn));

    let targets: Vec<PathBuf> = if paths.is_empty() {
        vec![config.base_path.clone()]
    } else {
        paths.iter().map(PathBuf::from).collect()
    };

    let mut reports = Vec::new();
    for target in &targets {
        reports.extend(transform_path(&pipeline, target, &settings.extensions, write)?);
    }

    for report in &reports {
        for warning in &report.warnings {
            println!("{}: {}", report.path.display(), warning);
        }
    }

    let changed = reports.iter().filter(|r| r.changed).count();
    if write {
        println!("{} of {} file(s) updated", changed, reports.len());
    } else {
        println!(
            "{} of {} file(s) would change (dry run, use --write to apply)",
            changed,
            reports.len()
        );
    }

    Ok(())
}

fn transform_path(
    pipeline: &Pipeline,
    path: &Path,
    extensions: &[String],
    write: bool,
) -> Result<Vec<FileReport>> {
    if path.is_dir() {
        pipeline
            .run_dir(path, extensions, write)
            .with_context(|| format!("Failed to transform {}", path.display()))
    } else {
        let report = pipeline
            .run_file(path, write)
            .with_context(|| format!("Failed to transform {}", path.display()))?;
        Ok(vec![report])
    }
}
