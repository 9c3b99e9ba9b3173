//! Enum extraction from game-server C++ headers (§4.6 "Enum extraction")
//!
//! Parses `enum Name { A = 1, B = A << 2, ... };` blocks with a restricted
//! expression grammar (`| & << + - ()`, numeric literals, and references
//! to sibling enumerators) rather than evaluating arbitrary C++.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One enumerator, labeled for UI display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumEntry {
    /// Raw C++ identifier, e.g. `SPELL_ATTR0_UNK0`
    pub name: String,
    /// Evaluated integer value
    pub value: i64,
    /// `Name` with the enum's common prefix stripped and snake→Title Case
    pub label: String,
}

/// One `enum { ... }` block extracted from a header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedEnum {
    /// C++ enum name
    pub name: String,
    /// Enumerators, in declaration order
    pub entries: Vec<EnumEntry>,
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            for c in chars.by_ref() {
                if c == '\n' {
                    out.push('\n');
                    break;
                }
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = ' ';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn find_enum_blocks(source: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let bytes = source.as_bytes();
    let mut search_from = 0;

    while let Some(rel) = source[search_from..].find("enum") {
        let start = search_from + rel;
        let is_word_boundary = |i: usize| i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        if !is_word_boundary(start) {
            search_from = start + 4;
            continue;
        }

        let after_keyword = &source[start + 4..];
        let name_end_rel = after_keyword.find('{');
        let Some(name_end_rel) = name_end_rel else { break };
        let name = after_keyword[..name_end_rel].trim().to_string();
        if name.is_empty() || name.contains([';', '}']) {
            search_from = start + 4;
            continue;
        }

        let body_start = start + 4 + name_end_rel + 1;
        let Some(body_end_rel) = source[body_start..].find('}') else { break };
        let body = source[body_start..body_start + body_end_rel].to_string();

        blocks.push((name, body));
        search_from = body_start + body_end_rel + 1;
    }

    blocks
}

/// Evaluate a restricted expression: `| & << + - ()`, decimal/hex literals,
/// and identifiers resolved through `symbols`. Any other token causes the
/// whole entry (not the whole enum) to be skipped.
fn eval_expr(expr: &str, symbols: &HashMap<String, i64>) -> Option<i64> {
    let tokens = tokenize(expr)?;
    let mut pos = 0;
    let value = parse_additive(&tokens, &mut pos, symbols)?;
    if pos == tokens.len() {
        Some(value)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(i64),
    Ident(String),
    Op(char),
    Shl,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
        } else if c == '+' || c == '-' || c == '|' || c == '&' {
            tokens.push(Token::Op(c));
            i += 1;
        } else if c == '<' && chars.get(i + 1) == Some(&'<') {
            tokens.push(Token::Shl);
            i += 2;
        } else if c.is_ascii_digit() {
            let start = i;
            if c == '0' && chars.get(i + 1).map(|c| c.to_ascii_lowercase()) == Some('x') {
                i += 2;
                while i < chars.len() && chars[i].is_ascii_hexdigit() {
                    i += 1;
                }
                let text = &chars[start + 2..i].iter().collect::<String>();
                let value = i64::from_str_radix(text, 16).ok()?;
                tokens.push(Token::Number(value));
            } else {
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(text.parse().ok()?));
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            return None;
        }
    }
    Some(tokens)
}

fn parse_additive(tokens: &[Token], pos: &mut usize, symbols: &HashMap<String, i64>) -> Option<i64> {
    let mut value = parse_bitwise(tokens, pos, symbols)?;
    while let Some(Token::Op(op @ ('+' | '-'))) = tokens.get(*pos) {
        let op = *op;
        *pos += 1;
        let rhs = parse_bitwise(tokens, pos, symbols)?;
        value = if op == '+' { value + rhs } else { value - rhs };
    }
    Some(value)
}

fn parse_bitwise(tokens: &[Token], pos: &mut usize, symbols: &HashMap<String, i64>) -> Option<i64> {
    let mut value = parse_shift(tokens, pos, symbols)?;
    while let Some(Token::Op(op @ ('|' | '&'))) = tokens.get(*pos) {
        let op = *op;
        *pos += 1;
        let rhs = parse_shift(tokens, pos, symbols)?;
        value = if op == '|' { value | rhs } else { value & rhs };
    }
    Some(value)
}

fn parse_shift(tokens: &[Token], pos: &mut usize, symbols: &HashMap<String, i64>) -> Option<i64> {
    let mut value = parse_primary(tokens, pos, symbols)?;
    while tokens.get(*pos) == Some(&Token::Shl) {
        *pos += 1;
        let rhs = parse_primary(tokens, pos, symbols)?;
        value <<= rhs;
    }
    Some(value)
}

fn parse_primary(tokens: &[Token], pos: &mut usize, symbols: &HashMap<String, i64>) -> Option<i64> {
    match tokens.get(*pos)? {
        Token::Number(n) => {
            *pos += 1;
            Some(*n)
        }
        Token::Ident(name) => {
            *pos += 1;
            symbols.get(name).copied()
        }
        Token::LParen => {
            *pos += 1;
            let value = parse_additive(tokens, pos, symbols)?;
            if tokens.get(*pos) == Some(&Token::RParen) {
                *pos += 1;
                Some(value)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Strip `enum_name`'s common screaming-snake prefix from `entry_name` and
/// convert the remainder to Title Case.
fn label_from_name(enum_name: &str, entry_name: &str) -> String {
    let prefix_guess = enum_name
        .chars()
        .fold(String::new(), |mut acc, c| {
            if c.is_uppercase() && !acc.is_empty() {
                acc.push('_');
            }
            acc.push(c.to_ascii_uppercase());
            acc
        });

    let stripped = entry_name
        .strip_prefix(&format!("{prefix_guess}_"))
        .unwrap_or(entry_name);

    stripped
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_enum_body(enum_name: &str, body: &str) -> Vec<EnumEntry> {
    let mut symbols = HashMap::new();
    let mut entries = Vec::new();
    let mut next_implicit = 0i64;

    for raw_entry in body.split(',') {
        let raw_entry = raw_entry.trim();
        if raw_entry.is_empty() {
            continue;
        }

        let (name, expr) = match raw_entry.split_once('=') {
            Some((n, e)) => (n.trim(), Some(e.trim())),
            None => (raw_entry, None),
        };
        if name.is_empty() || !name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            continue;
        }

        let value = match expr {
            Some(expr) => match eval_expr(expr, &symbols) {
                Some(v) => v,
                None => continue,
            },
            None => next_implicit,
        };

        symbols.insert(name.to_string(), value);
        next_implicit = value + 1;

        entries.push(EnumEntry {
            label: label_from_name(enum_name, name),
            name: name.to_string(),
            value,
        });
    }

    entries
}

/// Extract every enum declared in `source`
pub fn extract_from_source(source: &str) -> Vec<ExtractedEnum> {
    let cleaned = strip_comments(source);
    find_enum_blocks(&cleaned)
        .into_iter()
        .map(|(name, body)| {
            let entries = parse_enum_body(&name, &body);
            ExtractedEnum { name, entries }
        })
        .collect()
}

fn file_mtime_secs(path: &Path) -> std::io::Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/// Caches extraction results keyed by the source files' mtimes, so headers
/// are only re-parsed after they change on disk.
#[derive(Default)]
pub struct EnumCache {
    cache: Mutex<Option<(Vec<u64>, Vec<ExtractedEnum>)>>,
}

impl EnumCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every enum from `paths`, reusing the previous result if no
    /// source file's mtime has changed.
    pub fn extract(&self, paths: &[PathBuf]) -> std::io::Result<Vec<ExtractedEnum>> {
        let mtimes: Vec<u64> = paths.iter().map(|p| file_mtime_secs(p)).collect::<std::io::Result<_>>()?;

        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some((cached_mtimes, cached)) = cache.as_ref() {
            if cached_mtimes == &mtimes {
                return Ok(cached.clone());
            }
        }

        let mut all = Vec::new();
        for path in paths {
            let source = std::fs::read_to_string(path)?;
            all.extend(extract_from_source(&source));
        }

        *cache = Some((mtimes, all.clone()));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_shift_and_or_expressions() {
        let header = r"
            enum SpellAttr0 {
                SPELL_ATTR0_UNK0 = 0x00000001,
                SPELL_ATTR0_RANGED = 1 << 1,
                SPELL_ATTR0_COMBO = SPELL_ATTR0_UNK0 | SPELL_ATTR0_RANGED,
            };
        ";
        let enums = extract_from_source(header);
        assert_eq!(enums.len(), 1);
        let entries = &enums[0].entries;
        assert_eq!(entries[0].value, 1);
        assert_eq!(entries[1].value, 2);
        assert_eq!(entries[2].value, 3);
        assert_eq!(entries[1].label, "Ranged");
    }

    #[test]
    fn skips_entries_with_disallowed_expressions() {
        let header = r"
            enum Foo {
                FOO_OK = 1,
                FOO_BAD = some_function(1),
                FOO_NEXT = 5,
            };
        ";
        let enums = extract_from_source(header);
        let names: Vec<_> = enums[0].entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["FOO_OK", "FOO_NEXT"]);
    }

    #[test]
    fn strips_block_and_line_comments() {
        let header = "// leading\nenum A { /* mid */ A_ONE = 1, A_TWO = 2 };";
        let enums = extract_from_source(header);
        assert_eq!(enums[0].entries.len(), 2);
    }

    #[test]
    fn cache_reuses_result_when_mtime_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Shared.h");
        std::fs::write(&path, "enum A { A_ONE = 1 };").unwrap();

        let cache = EnumCache::new();
        let first = cache.extract(&[path.clone()]).unwrap();
        let second = cache.extract(&[path]).unwrap();
        assert_eq!(first, second);
    }
}
