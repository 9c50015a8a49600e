//! Named bind markers in hand-written CQL.

use crate::error::{CqlxError, Result};
use crate::table::Statement;

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the index just past the string, quoted identifier, comment or
/// `$$` literal starting at `i`, or None when none starts there.
fn opaque_end(bytes: &[u8], i: usize) -> Result<Option<usize>> {
    let (open, close, message): (usize, &[u8], &str) = match &bytes[i..] {
        [b'\'', ..] => (1, &b"'"[..], "unterminated quote"),
        [b'"', ..] => (1, &b"\""[..], "unterminated quote"),
        [b'$', b'$', ..] => (2, &b"$$"[..], "unterminated $$ literal"),
        [b'/', b'*', ..] => (2, &b"*/"[..], "unterminated block comment"),
        [b'-', b'-', ..] | [b'/', b'/', ..] => {
            let line_end = bytes[i..].iter().position(|&b| b == b'\n');
            return Ok(Some(line_end.map_or(bytes.len(), |n| i + n + 1)));
        }
        _ => return Ok(None),
    };

    let body = i + open;
    bytes[body..]
        .windows(close.len())
        .position(|w| w == close)
        .map(|n| Some(body + n + close.len()))
        .ok_or_else(|| CqlxError::MalformedStatement {
            position: i,
            message: message.into(),
        })
}

/// Rewrites `:name` markers to `?` and collects the names in order.
///
/// Single-quoted strings, double-quoted identifiers, `$$` literals and
/// comments (`--`, `//`, `/* */`) are copied unchanged, as is `::`.
///
/// # Errors
///
/// Returns `MalformedStatement` for a `:` not followed by an identifier, a
/// positional `?` marker, or an unterminated quote, literal or block comment.
pub fn compile_named_query(text: &str) -> Result<Statement> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut names = Vec::new();
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i)? {
            i = end;
            continue;
        }

        match bytes[i] {
            b'?' => {
                return Err(CqlxError::MalformedStatement {
                    position: i,
                    message: "positional marker in named statement".into(),
                });
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' => {
                if !bytes.get(i + 1).copied().is_some_and(is_ident_start) {
                    return Err(CqlxError::MalformedStatement {
                        position: i,
                        message: "expected identifier after ':'".into(),
                    });
                }
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_ident(bytes[end]) {
                    end += 1;
                }
                out.push_str(&text[copied..i]);
                out.push('?');
                names.push(text[start..end].to_string());
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    out.push_str(&text[copied..]);
    Ok(Statement::custom(out, names))
}
