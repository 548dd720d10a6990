//! Transform pipeline and file runner
//!
//! Transforms run in sequence, each receiving the previous one's output.
//! The pipeline itself never fails on source content; only file access
//! produces errors. A directory run reports per-file access errors as
//! warnings and keeps going.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::transforms::{ClassNameOrder, Transform};

/// Output of a full pipeline run over one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    /// Final source text
    pub content: String,
    /// Whether any transform changed the text
    pub changed: bool,
    /// Warnings from every transform, in run order
    pub warnings: Vec<String>,
    /// Names of the transforms that changed the text
    pub applied: Vec<String>,
}

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File path
    pub path: PathBuf,
    /// Whether the pipeline changed the content
    pub changed: bool,
    /// Whether the new content was written back
    pub written: bool,
    /// Transforms that changed the content
    pub applied: Vec<String>,
    /// Warnings collected while transforming
    pub warnings: Vec<String>,
}

impl FileReport {
    /// Report for a file that could not be processed
    pub fn skipped(path: impl Into<PathBuf>, error: &Error) -> Self {
        Self {
            path: path.into(),
            changed: false,
            written: false,
            applied: Vec::new(),
            warnings: vec![format!("Skipped: {}", error)],
        }
    }
}

/// Ordered list of transforms
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with the built-in transforms, targeting `target_fn` calls
    pub fn with_defaults(target_fn: &str) -> Self {
        Self::new().with(ClassNameOrder::new(target_fn))
    }

    /// Append a transform
    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Names of the transforms, in run order
    pub fn names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Run every transform over `source`
    pub fn run(&self, source: &str) -> PipelineResult {
        let mut content = source.to_string();
        let mut warnings = Vec::new();
        let mut applied = Vec::new();

        for transform in &self.transforms {
            let result = transform.apply(&content);
            warnings.extend(result.warnings);
            if result.changed {
                applied.push(transform.name().to_string());
                content = result.content;
            }
        }

        PipelineResult {
            changed: content != source,
            content,
            warnings,
            applied,
        }
    }

    /// Run over one file, writing the result back when `write` is set
    pub fn run_file(&self, path: impl AsRef<Path>, write: bool) -> Result<FileReport> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let result = self.run(&source);
        let written = write && result.changed;
        if written {
            std::fs::write(path, &result.content).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!("Transformed: {}", path.display());
        } else if result.changed {
            tracing::info!("Would transform: {}", path.display());
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            changed: result.changed,
            written,
            applied: result.applied,
            warnings: result.warnings,
        })
    }

    /// Run over every file under `dir` whose extension is in `extensions`.
    ///
    /// Hidden directories and `node_modules` are skipped. Files are
    /// processed in path order. Only a `dir` that cannot be read fails the
    /// run; a file or subdirectory that cannot be read or written gets a
    /// report carrying the error as a warning.
    pub fn run_dir(
        &self,
        dir: impl AsRef<Path>,
        extensions: &[String],
        write: bool,
    ) -> Result<Vec<FileReport>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        let mut reports = Vec::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    let is_root = e.depth() == 0;
                    let error = Error::Io {
                        path: path.clone(),
                        source: e.into(),
                    };
                    if is_root {
                        return Err(error);
                    }
                    tracing::warn!("{}", error);
                    reports.push(FileReport::skipped(path, &error));
                    continue;
                }
            };
            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!("Found {} source file(s) under {}", files.len(), dir.display());
        for path in files {
            match self.run_file(&path, write) {
                Ok(report) => reports.push(report),
                Err(error) => {
                    tracing::warn!("{}", error);
                    reports.push(FileReport::skipped(path, &error));
                }
            }
        }

        Ok(reports)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}
