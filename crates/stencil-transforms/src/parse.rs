//! TypeScript/JSX parsing

use swc_core::common::{BytePos, FileName, SourceMap, Span, sync::Lrc};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::parser::{Parser, StringInput, Syntax, TsSyntax, lexer::Lexer};

use crate::error::{Error, Result};

const BOM: char = '\u{feff}';

/// A parsed module together with the offset of its source in the source map
pub struct ParsedSource {
    /// Module syntax tree
    pub module: Module,
    start_pos: BytePos,
    /// Length of a leading byte order mark not seen by the parser
    bom_len: usize,
}

impl ParsedSource {
    /// Byte offset of `pos` into the original source text
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start_pos.0) as usize + self.bom_len
    }

    /// Byte range of `span` in the original source text
    pub fn range(&self, span: Span) -> (usize, usize) {
        (self.offset(span.lo), self.offset(span.hi))
    }
}

/// Parse `source` as a TSX module.
///
/// Recoverable parser errors are treated as failures: a rewrite of a tree
/// the parser had to patch up could move the wrong text.
///
/// Offsets always refer to `source` as given, including a leading byte order
/// mark, which the source map would otherwise drop.
pub fn parse_tsx(source: &str) -> Result<ParsedSource> {
    let (bom_len, body) = match source.strip_prefix(BOM) {
        Some(rest) => (BOM.len_utf8(), rest),
        None => (0, source),
    };

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("input.tsx".into()).into(),
        body.to_string(),
    );

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        ..Default::default()
    });
    let lexer = Lexer::new(syntax, EsVersion::latest(), StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| Error::Parse {
        message: format!("{:?}", e.kind()),
    })?;

    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(Error::Parse {
            message: format!("{:?}", e.kind()),
        });
    }

    Ok(ParsedSource {
        module,
        start_pos: fm.start_pos,
        bom_len,
    })
}

/// 1-based line number of a byte offset
pub fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_tsx() {
        let parsed = parse_tsx("export const A = () => <div className=\"x\" />;").unwrap();
        assert_eq!(parsed.module.body.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_source() {
        let err = parse_tsx("const = ;").err().unwrap();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_offsets_are_relative_to_source() {
        use swc_core::common::Spanned;

        let parsed = parse_tsx("let a = 1;\nlet b = 2;").unwrap();
        let (start, end) = parsed.range(parsed.module.body[1].span());
        assert_eq!((start, end), (11, 21));
    }

    #[test]
    fn test_offsets_count_leading_bom() {
        use swc_core::common::Spanned;

        let source = "\u{feff}let a = 1;";
        let parsed = parse_tsx(source).unwrap();
        let (start, end) = parsed.range(parsed.module.body[0].span());
        assert_eq!(&source[start..end], "let a = 1;");
    }

    #[test]
    fn test_line_of() {
        let source = "a\nb\nc";
        assert_eq!(line_of(source, 0), 1);
        assert_eq!(line_of(source, 2), 2);
        assert_eq!(line_of(source, 4), 3);
    }
}
