//! Rendering modes and presentation markers.
//!
//! Color mode decorates keywords and identifiers with `${...}` markers
//! (translated to terminal escapes by the front end); stripping the markers
//! from a colored rendering yields the plain rendering byte for byte.
//! Uppercase mode upper-cases keywords only — identifiers and values are
//! case-sensitive data.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Color,
    Uppercase,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Color => "color",
            OutputFormat::Uppercase => "uppercase",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(OutputFormat::Plain),
            "color" => Ok(OutputFormat::Color),
            "uppercase" => Ok(OutputFormat::Uppercase),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Options for one rendering pass.
#[derive(Debug, Clone, Default)]
pub struct RenderOpts {
    pub format: OutputFormat,
    /// Emit the comment lines attached to an object ahead of it.
    pub with_comments: bool,
}

impl RenderOpts {
    pub fn plain() -> Self {
        RenderOpts::default()
    }

    pub fn with_format(format: OutputFormat) -> Self {
        RenderOpts {
            format,
            ..RenderOpts::default()
        }
    }

    /// Decorate a grammar keyword.
    pub fn keyword(&self, word: &str) -> String {
        match self.format {
            OutputFormat::Plain => word.to_string(),
            OutputFormat::Color => format!("${{keyword}}{}${{normal}}", word),
            OutputFormat::Uppercase => word.to_uppercase(),
        }
    }

    /// Decorate an identifier. Identifiers are data; only color touches them.
    pub fn ident(&self, word: &str) -> String {
        match self.format {
            OutputFormat::Color => format!("${{id}}{}${{normal}}", word),
            _ => word.to_string(),
        }
    }
}

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{[^}]+\}").expect("marker regex"));

/// Remove every `${...}` presentation marker.
pub fn strip_markers(s: &str) -> String {
    MARKER.replace_all(s, "").into_owned()
}
