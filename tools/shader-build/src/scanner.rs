//! Entry-point scanner
//!
//! Decides which catalog stages a shader defines by looking for each entry
//! point name followed by an opening parenthesis. This is a lexical check,
//! not a parse: comments and string literals are blanked out first, and the
//! name must start on a word boundary and end right before optional
//! whitespace and `(`.

use regex::Regex;

use crate::catalog::{Catalog, StageDescriptor};
use crate::error::CompileError;

/// Result of scanning one source file.
#[derive(Debug)]
pub struct ScanResult<'a> {
    /// Stages whose entry point is defined, in catalog order
    pub matched: Vec<&'a StageDescriptor>,
    /// Stages whose entry point was not found, in catalog order
    pub missing: Vec<&'a StageDescriptor>,
}

impl ScanResult<'_> {
    /// True when the file has nothing to compile.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Catalog plus one compiled pattern per entry point.
#[derive(Debug)]
pub struct Scanner {
    catalog: Catalog,
    patterns: Vec<Regex>,
}

impl Scanner {
    pub fn new(catalog: Catalog) -> Result<Self, CompileError> {
        let patterns = catalog
            .iter()
            .map(|descriptor| entry_point_pattern(&descriptor.entry_point))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { catalog, patterns })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Scan shader source text against the catalog.
    pub fn scan(&self, source: &str) -> ScanResult<'_> {
        let code = strip_comments_and_strings(source);

        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for (descriptor, pattern) in self.catalog.iter().zip(&self.patterns) {
            if pattern.is_match(&code) {
                matched.push(descriptor);
            } else {
                missing.push(descriptor);
            }
        }

        ScanResult { matched, missing }
    }
}

fn entry_point_pattern(entry_point: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\s*\(", regex::escape(entry_point)))
}

#[derive(Clone, Copy, PartialEq)]
enum Lex {
    Code,
    LineComment,
    BlockComment,
    Str,
}

/// Replace comment and string literal contents with spaces.
///
/// Newlines are kept so the output lines up with the input.
pub fn strip_comments_and_strings(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut state = Lex::Code;
    let mut chars = source.chars().peekable();

    let blank = |c: char| if c == '\n' { '\n' } else { ' ' };

    while let Some(c) = chars.next() {
        match state {
            Lex::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::BlockComment;
                }
                '"' => {
                    out.push(' ');
                    state = Lex::Str;
                }
                _ => out.push(c),
            },
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                }
                out.push(blank(c));
            }
            Lex::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::Code;
                } else {
                    out.push(blank(c));
                }
            }
            Lex::Str => match c {
                '\\' => {
                    out.push(' ');
                    if let Some(escaped) = chars.next() {
                        out.push(blank(escaped));
                    }
                }
                '"' => {
                    out.push(' ');
                    state = Lex::Code;
                }
                // Unterminated literal ends at the line break.
                '\n' => {
                    out.push('\n');
                    state = Lex::Code;
                }
                _ => out.push(' '),
            },
        }
    }

    out
}
