//! Reading a declaration list back out of source text.

use crate::codegen::DIGEST_LINE_PREFIX;
use lazymod_kernel::ExportTableError;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("no `DECLARED_EXPORTS` constant found")]
    MissingConstant,

    #[error("`DECLARED_EXPORTS` is defined {0} times")]
    MultipleConstants(usize),

    #[error("`DECLARED_EXPORTS` contains a non-literal entry: {0}")]
    InvalidEntry(String),

    #[error("`DECLARED_EXPORTS` contains an invalid escape in \"{0}\"")]
    InvalidEscape(String),

    #[error(transparent)]
    Table(#[from] ExportTableError),
}

fn declared_exports_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)pub\s+const\s+DECLARED_EXPORTS\s*:\s*&\s*\[\s*&\s*(?:'static\s+)?str\s*\]\s*=\s*&\s*\[(.*?)\]\s*;",
        )
        .expect("declared-exports regex must compile")
    })
}

fn string_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("string-literal regex must compile")
    })
}

fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*").expect("line-comment regex must compile"))
}

/// Entries of the `DECLARED_EXPORTS` constant, in source order.
///
/// Duplicates are kept so the parity check can report them.
pub fn parse_declared_exports(source: &str) -> Result<Vec<String>, DeclarationError> {
    let mut bodies = declared_exports_re().captures_iter(source);
    let body = match bodies.next() {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
        None => return Err(DeclarationError::MissingConstant),
    };
    let extra = bodies.count();
    if extra > 0 {
        return Err(DeclarationError::MultipleConstants(extra + 1));
    }

    let body = line_comment_re().replace_all(body, "");
    let mut names = Vec::new();
    for captures in string_literal_re().captures_iter(&body) {
        if let Some(literal) = captures.get(1) {
            let raw = literal.as_str();
            let name = unescape_str_literal(raw)
                .ok_or_else(|| DeclarationError::InvalidEscape(raw.to_string()))?;
            names.push(name);
        }
    }

    let leftover = string_literal_re().replace_all(&body, "");
    if let Some(stray) = leftover
        .split(',')
        .map(str::trim)
        .find(|piece| !piece.is_empty())
    {
        return Err(DeclarationError::InvalidEntry(stray.to_string()));
    }
    Ok(names)
}

/// Contents of a `"..."` literal with its escapes resolved. `None` on an
/// escape Rust would reject.
fn unescape_str_literal(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return None;
                }
                let value = u8::from_str_radix(&hex, 16).ok().filter(|v| v.is_ascii())?;
                out.push(char::from(value));
            }
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let mut hex = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '_' => {}
                        digit => hex.push(digit),
                    }
                }
                if hex.is_empty() || hex.len() > 6 {
                    return None;
                }
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            // Line continuation: the newline and leading whitespace vanish.
            '\n' => {
                let rest = chars.as_str().trim_start();
                chars = rest.chars();
            }
            _ => return None,
        }
    }
    Some(out)
}

/// Manifest digest recorded in a generated module's banner, if any.
pub fn parse_manifest_digest(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        line.trim()
            .strip_prefix(DIGEST_LINE_PREFIX)
            .map(|digest| digest.trim().to_string())
            .filter(|digest| !digest.is_empty())
    })
}
