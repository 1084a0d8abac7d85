//! Module reference grammar for JavaScript/TypeScript sources
//!
//! Recognizes the four reference forms the rewriter understands:
//!
//! - `import <clause> from '<specifier>'` (static import)
//! - `export <clause> from '<specifier>'` (re-export)
//! - `require('<specifier>')`
//! - `import('<specifier>')` (dynamic import)
//!
//! All forms are compiled into one pattern so that at any position the static
//! form wins over the dynamic one and matches never overlap. Scanning works on
//! raw bytes; text that is not valid UTF-8 passes through untouched.
//!
//! Whitespace inside a reference is limited to spaces and tabs, so a reference
//! never spans a line break. The streaming engine relies on this.

use once_cell::sync::Lazy;
use regex::bytes::{Captures, Match, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Combined reference pattern.
///
/// Alternatives are ordered: static declaration, `require` call, dynamic import.
/// The binding clause may not contain quotes, backticks, parentheses,
/// semicolons or line breaks, which keeps `import('x')` out of the static form.
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x-u)
        # import-from / export-from
        \b(?P<decl>import|export)\b
        [\x20\t]*
        (?P<clause>[^'"`;()\r\n]+?)
        [\x20\t]*\bfrom
        [\x20\t]*
        (?:'(?P<from_sq>[^'\r\n]+)'|"(?P<from_dq>[^"\r\n]+)")
        (?P<term>[\x20\t]*;)?
        |
        # require call
        \brequire[\x20\t]*\([\x20\t]*
        (?:'(?P<req_sq>[^'\r\n]+)'|"(?P<req_dq>[^"\r\n]+)")
        [\x20\t]*\)
        |
        # dynamic import
        \bimport[\x20\t]*\([\x20\t]*
        (?:'(?P<dyn_sq>[^'\r\n]+)'|"(?P<dyn_dq>[^"\r\n]+)")
        [\x20\t]*\)
        "#,
    )
    .expect("module reference regex should be valid")
});

/// Syntactic category of a module reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    ImportFrom,
    ExportFrom,
    RequireCall,
    DynamicImport,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::ImportFrom,
        ReferenceKind::ExportFrom,
        ReferenceKind::RequireCall,
        ReferenceKind::DynamicImport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::ImportFrom => "import-from",
            ReferenceKind::ExportFrom => "export-from",
            ReferenceKind::RequireCall => "require-call",
            ReferenceKind::DynamicImport => "dynamic-import",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote character around a module specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_byte(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        }
    }
}

/// Kind-specific parts of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceForm<'a> {
    /// `import <clause> from '<specifier>'`
    ImportFrom {
        clause: &'a [u8],
        /// Trailing `;` including any spaces before it, if present
        terminator: Option<&'a [u8]>,
    },
    /// `export <clause> from '<specifier>'`
    ExportFrom {
        clause: &'a [u8],
        terminator: Option<&'a [u8]>,
    },
    /// `require('<specifier>')`
    RequireCall,
    /// `import('<specifier>')`
    DynamicImport,
}

/// A module reference found by [`scan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Byte range of the whole reference in the scanned buffer
    pub span: Range<usize>,
    /// The exact matched text
    pub text: &'a [u8],
    pub quote: Quote,
    /// Raw bytes of the module specifier, without quotes
    pub specifier: &'a [u8],
    /// Byte range of the specifier in the scanned buffer
    pub specifier_span: Range<usize>,
    pub form: ReferenceForm<'a>,
}

impl<'a> Reference<'a> {
    pub fn kind(&self) -> ReferenceKind {
        match self.form {
            ReferenceForm::ImportFrom { .. } => ReferenceKind::ImportFrom,
            ReferenceForm::ExportFrom { .. } => ReferenceKind::ExportFrom,
            ReferenceForm::RequireCall => ReferenceKind::RequireCall,
            ReferenceForm::DynamicImport => ReferenceKind::DynamicImport,
        }
    }

    /// The module specifier as text, if it is valid UTF-8
    pub fn specifier_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.specifier).ok()
    }

    /// Specifier range relative to the start of [`Reference::text`]
    pub fn specifier_offsets(&self) -> Range<usize> {
        self.specifier_span.start - self.span.start..self.specifier_span.end - self.span.start
    }
}

/// Iterator over the references in a buffer.
///
/// Holds an explicit cursor; each step resumes right after the previous match.
#[derive(Debug, Clone)]
pub struct References<'a> {
    haystack: &'a [u8],
    cursor: usize,
}

impl<'a> References<'a> {
    /// Current scan position
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for References<'a> {
    type Item = Reference<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor > self.haystack.len() {
                return None;
            }
            let caps = REFERENCE_RE.captures_at(self.haystack, self.cursor)?;
            let whole = caps.get(0)?;
            self.cursor = whole.end().max(whole.start() + 1);
            if let Some(reference) = classify(&caps) {
                return Some(reference);
            }
        }
    }
}

/// Scan a whole buffer for module references
pub fn scan(haystack: &[u8]) -> References<'_> {
    scan_from(haystack, 0)
}

/// Scan starting at `start`.
///
/// Bytes before `start` are not matched but still count as context for word
/// boundaries, so `xrequire('a')` scanned from the `r` does not match.
pub fn scan_from(haystack: &[u8], start: usize) -> References<'_> {
    References {
        haystack,
        cursor: start,
    }
}

fn classify<'a>(caps: &Captures<'a>) -> Option<Reference<'a>> {
    let whole = caps.get(0)?;

    let (quote, specifier, form) = if let Some(decl) = caps.name("decl") {
        let (quote, specifier) = quoted(caps, "from_sq", "from_dq")?;
        let clause = caps.name("clause")?.as_bytes().trim_ascii();
        let terminator = caps.name("term").map(|m| m.as_bytes());
        let form = if decl.as_bytes() == b"import" {
            ReferenceForm::ImportFrom { clause, terminator }
        } else {
            ReferenceForm::ExportFrom { clause, terminator }
        };
        (quote, specifier, form)
    } else if let Some((quote, specifier)) = quoted(caps, "req_sq", "req_dq") {
        (quote, specifier, ReferenceForm::RequireCall)
    } else {
        let (quote, specifier) = quoted(caps, "dyn_sq", "dyn_dq")?;
        (quote, specifier, ReferenceForm::DynamicImport)
    };

    Some(Reference {
        span: whole.range(),
        text: whole.as_bytes(),
        quote,
        specifier: specifier.as_bytes(),
        specifier_span: specifier.range(),
        form,
    })
}

fn quoted<'a>(caps: &Captures<'a>, single: &str, double: &str) -> Option<(Quote, Match<'a>)> {
    if let Some(m) = caps.name(single) {
        Some((Quote::Single, m))
    } else {
        caps.name(double).map(|m| (Quote::Double, m))
    }
}
