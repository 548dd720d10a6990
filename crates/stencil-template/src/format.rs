//! Line-break repair for collapsed templates
//!
//! Some `.hbs` templates end up squashed onto one or two lines after being
//! round-tripped through tools that strip newlines. This restores enough
//! structure to make them readable again. It does not try to be a real
//! formatter: templates that already span more than ten lines are left
//! alone.

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Templates with more lines than this are considered formatted
const FORMATTED_LINE_THRESHOLD: usize = 10;

static IMPORT_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(import[^;]+from\s+['"][^'"]+['"])"#).expect("valid regex"));
static BEFORE_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(import\s)").expect("valid regex"));
static BEFORE_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(export\s)").expect("valid regex"));
static BEFORE_DESCRIBE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(describe\()").expect("valid regex"));
static BEFORE_IT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(it\()").expect("valid regex"));
static BEFORE_EACH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(beforeEach\()").expect("valid regex"));
static AFTER_CALL_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\}\)\s+").expect("valid regex"));
static AFTER_SEMICOLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";\s*([a-zA-Z])").expect("valid regex"));
static AFTER_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\}\s+([a-zA-Z])").expect("valid regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n\n+").expect("valid regex"));

/// Restore line breaks in a collapsed template.
///
/// Returns `None` when the template already looks formatted.
pub fn format_template(content: &str) -> Option<String> {
    if content.split('\n').count() > FORMATTED_LINE_THRESHOLD {
        return None;
    }

    let rules: [(&Regex, &str); 9] = [
        (&IMPORT_FROM, "${1}\n"),
        (&BEFORE_IMPORT, "\n${1}"),
        (&BEFORE_EXPORT, "\n${1}"),
        (&BEFORE_DESCRIBE, "\n\n${1}"),
        (&BEFORE_IT, "\n\n  ${1}"),
        (&BEFORE_EACH, "\n\n  ${1}"),
        (&AFTER_CALL_CLOSE, "})\n"),
        (&AFTER_SEMICOLON, ";\n${1}"),
        (&AFTER_BRACE, "}\n${1}"),
    ];

    let mut formatted = content.to_string();
    for (pattern, replacement) in rules {
        formatted = pattern.replace_all(&formatted, replacement).into_owned();
    }
    Some(BLANK_RUNS.replace_all(&formatted, "\n\n").into_owned())
}

/// Format every `.hbs` file under `dir` in place.
///
/// Returns the paths that were rewritten.
pub fn format_templates_in(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut changed = Vec::new();

    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir.as_ref())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "hbs"))
        .collect();
    paths.sort();

    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        if let Some(formatted) = format_template(&content) {
            std::fs::write(&path, formatted)?;
            tracing::info!("Fixed: {}", path.display());
            changed.push(path);
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_templates_untouched() {
        let content = (0..12).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        assert!(format_template(&content).is_none());
    }

    #[test]
    fn test_splits_imports_and_statements() {
        let content = "import a from 'a'; import b from \"b\"; export const x = 1; const y = 2;";
        let formatted = format_template(content).unwrap();
        assert_eq!(
            formatted,
            "import a from 'a'\n;\nimport b from \"b\"\n;\nexport const x = 1;\nconst y = 2;"
        );
    }

    #[test]
    fn test_splits_test_blocks() {
        let content = "describe('x', () => { beforeEach(() => {}) it('works', () => { expect(1).toBe(1) }) })";
        let formatted = format_template(content).unwrap();
        assert_eq!(
            formatted,
            "describe('x', () => {\n\n  beforeEach(() => {})\nit('works', () => { expect(1).toBe(1) })\n})"
        );
    }

    #[test]
    fn test_format_templates_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts.hbs"), "const a = 1; const b = 2;").unwrap();
        let long = "x\n".repeat(20);
        std::fs::write(dir.path().join("b.ts.hbs"), &long).unwrap();
        std::fs::write(dir.path().join("c.txt"), "const a = 1; const b = 2;").unwrap();

        let changed = format_templates_in(dir.path()).unwrap();
        assert_eq!(changed, vec![dir.path().join("a.ts.hbs")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.ts.hbs")).unwrap(),
            "const a = 1;\nconst b = 2;"
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("b.ts.hbs")).unwrap(), long);
    }
}
