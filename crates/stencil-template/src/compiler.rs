//! Template compiler
//!
//! Compiles Handlebars templates once, caches them per path, and renders
//! them against a freshly sanitized context on every call.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Output, RenderContext, RenderError, Renderable, Template, TemplateError,
};
use serde::Serialize;
use serde_json::Value;

use stencil_core::config::TemplateConfig;
use stencil_core::sanitize::sanitize_template_context;

use crate::cache::{CacheEntry, CacheStats, TemplateCache};
use crate::error::{Error, Result};
use crate::fs::{TemplateFs, TokioFs};
use crate::helpers::{guard_triple_stash, register_helpers};

/// Options for the compiler
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Maximum number of compiled templates kept in the cache
    pub max_cache_size: usize,

    /// Fail on unresolved placeholders instead of leaving them verbatim
    pub strict: bool,

    /// HTML-escape interpolated values
    pub escape_html: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_cache_size: 100,
            strict: false,
            escape_html: false,
        }
    }
}

impl From<&TemplateConfig> for CompileOptions {
    fn from(config: &TemplateConfig) -> Self {
        Self {
            max_cache_size: config.max_cache_size,
            strict: config.strict,
            escape_html: config.escape_html,
        }
    }
}

/// A parsed template, ready to render against any context
#[derive(Debug)]
pub struct CompiledTemplate {
    template: Template,
}

impl CompiledTemplate {
    /// Parse template source
    pub fn compile(source: &str) -> std::result::Result<Self, TemplateError> {
        Template::compile(&guard_triple_stash(source)).map(|template| Self { template })
    }

    /// Render with the helpers and settings of `registry`
    pub fn render(
        &self,
        registry: &Handlebars<'_>,
        data: &Value,
    ) -> std::result::Result<String, RenderError> {
        let ctx = Context::wraps(data)?;
        let mut rc = RenderContext::new(None);
        let mut out = StringSink::default();
        self.template.render(registry, &ctx, &mut rc, &mut out)?;
        Ok(out.0)
    }
}

#[derive(Default)]
struct StringSink(String);

impl Output for StringSink {
    fn write(&mut self, seg: &str) -> io::Result<()> {
        self.0.push_str(seg);
        Ok(())
    }
}

/// Outcome of a [`Compiler::precompile`] batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrecompileReport {
    /// Templates now in the cache
    pub compiled: Vec<PathBuf>,

    /// Templates that could not be read or parsed
    pub skipped: Vec<PathBuf>,
}

/// Template compiler
///
/// Holds the helper registry, the compiled template cache and the
/// filesystem used to read templates. There is no process-wide state:
/// build one compiler and pass it to whatever renders templates.
pub struct Compiler {
    registry: Handlebars<'static>,
    cache: TemplateCache,
    options: CompileOptions,
    helpers_registered: bool,
    fs: Arc<dyn TemplateFs>,
}

impl Compiler {
    /// Create a compiler reading templates from disk
    pub fn new(options: CompileOptions) -> Self {
        Self::with_fs(options, Arc::new(TokioFs))
    }

    /// Create a compiler reading templates through `fs`
    pub fn with_fs(options: CompileOptions, fs: Arc<dyn TemplateFs>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(options.strict);
        if !options.escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }

        Self {
            registry,
            cache: TemplateCache::new(options.max_cache_size),
            options,
            helpers_registered: false,
            fs,
        }
    }

    /// Register the template helpers, consuming and returning the compiler.
    ///
    /// Safe to call any number of times; only the first call registers.
    pub fn initialize(mut self) -> Self {
        self.ensure_helpers();
        self
    }

    /// Whether helpers have been registered
    pub fn is_initialized(&self) -> bool {
        self.helpers_registered
    }

    /// Compiler options
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn ensure_helpers(&mut self) {
        if self.helpers_registered {
            return;
        }
        register_helpers(&mut self.registry);
        self.helpers_registered = true;
        tracing::debug!("Registered template helpers");
    }

    /// Render the template at `path` with `context`.
    ///
    /// The compiled template is reused while the file's modification time is
    /// unchanged. The context is sanitized before every render.
    pub async fn compile(&mut self, path: impl AsRef<Path>, context: &Value) -> Result<String> {
        const OPERATION: &str = "compile";
        let path = path.as_ref();
        self.ensure_helpers();

        let template = match self.get_cached(path).await {
            Ok(Some(template)) => {
                tracing::debug!("Template cache hit: {}", path.display());
                template
            }
            Ok(None) => self.load(path, OPERATION).await?,
            Err(err) => {
                tracing::debug!("Cache lookup failed, recompiling: {}", err);
                self.load(path, OPERATION).await?
            }
        };

        let data = sanitize_template_context(context)
            .map_err(|e| Error::sanitization(OPERATION, Some(path), e))?;

        template
            .render(&self.registry, &data)
            .map_err(|e| Error::compile(OPERATION, Some(path), e))
    }

    /// Render inline template source without caching
    pub fn compile_str(&mut self, source: &str, context: &Value) -> Result<String> {
        const OPERATION: &str = "compile_str";
        self.ensure_helpers();

        let template =
            CompiledTemplate::compile(source).map_err(|e| Error::compile(OPERATION, None, e))?;
        let data =
            sanitize_template_context(context).map_err(|e| Error::sanitization(OPERATION, None, e))?;

        template
            .render(&self.registry, &data)
            .map_err(|e| Error::compile(OPERATION, None, e))
    }

    /// Return the cached template for `path` if it is still valid.
    ///
    /// A stale entry, or one whose file has disappeared, is evicted and
    /// reported as a miss.
    pub async fn get_cached(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Option<Arc<CompiledTemplate>>> {
        let path = path.as_ref();
        let Some(entry) = self.cache.get(path).cloned() else {
            return Ok(None);
        };

        match self.fs.modified(path).await {
            Ok(modified) if entry.is_fresh(modified) => Ok(Some(Arc::clone(&entry.template))),
            Ok(_) => {
                tracing::debug!("Template changed on disk, evicting: {}", path.display());
                self.cache.remove(path);
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Template removed, evicting: {}", path.display());
                self.cache.remove(path);
                Ok(None)
            }
            Err(source) => Err(Error::TemplateReadFailed {
                operation: "get_cached",
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Store a compiled template, evicting the oldest entry when full
    pub fn cache(&mut self, entry: CacheEntry) -> &mut Self {
        tracing::debug!(
            "Caching template {} ({}...)",
            entry.path.display(),
            entry.content_hash.get(..8).unwrap_or(&entry.content_hash)
        );
        self.cache.insert(entry);
        self
    }

    /// Compile a batch of templates into the cache.
    ///
    /// Every path is read and parsed in its own task. Paths that fail are
    /// listed in the report rather than returned as errors.
    pub async fn precompile<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<PrecompileReport> {
        self.ensure_helpers();

        let tasks: Vec<_> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref().to_path_buf();
                let fs = Arc::clone(&self.fs);
                tokio::spawn(async move {
                    let prepared = prepare(fs.as_ref(), &path, "precompile").await;
                    (path, prepared)
                })
            })
            .collect();

        let mut report = PrecompileReport::default();
        for joined in futures::future::join_all(tasks).await {
            let (path, prepared) = joined.map_err(|e| Error::PrecompileFailed {
                operation: "precompile",
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

            match prepared {
                Ok(entry) => {
                    self.cache(entry);
                    report.compiled.push(path);
                }
                Err(err) => {
                    tracing::debug!("Skipping template {}: {}", path.display(), err);
                    report.skipped.push(path);
                }
            }
        }

        tracing::info!(
            "Precompiled {} templates ({} skipped)",
            report.compiled.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Precompile every `.hbs` file under `dir`
    pub async fn precompile_dir(&mut self, dir: impl AsRef<Path>) -> Result<PrecompileReport> {
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "hbs"))
            .collect();
        paths.sort();

        self.precompile(&paths).await
    }

    /// Drop every cached template
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Snapshot of the cache
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Keep only the `max_entries` most recently inserted templates.
    ///
    /// Returns the number of templates removed.
    pub fn cleanup(&mut self, max_entries: usize) -> usize {
        let removed = self.cache.truncate_to_newest(max_entries);
        if removed > 0 {
            tracing::debug!("Removed {} cached templates", removed);
        }
        removed
    }

    async fn load(&mut self, path: &Path, operation: &'static str) -> Result<Arc<CompiledTemplate>> {
        let entry = prepare(self.fs.as_ref(), path, operation).await?;
        let template = Arc::clone(&entry.template);
        self.cache(entry);
        Ok(template)
    }
}

/// Read, hash and parse one template.
///
/// The modification time is taken before reading, so a write racing with
/// the read leaves an entry that is already stale.
async fn prepare(fs: &dyn TemplateFs, path: &Path, operation: &'static str) -> Result<CacheEntry> {
    let read_failed = |source| Error::TemplateReadFailed {
        operation,
        path: path.to_path_buf(),
        source,
    };

    let modified = fs.modified(path).await.map_err(read_failed)?;
    let source = fs.read_to_string(path).await.map_err(read_failed)?;
    let template =
        CompiledTemplate::compile(&source).map_err(|e| Error::compile(operation, Some(path), e))?;

    Ok(CacheEntry::new(path, Arc::new(template), modified, &source))
}
