//! The YAML subset found in blog front matter.
//!
//! Supported: `key: value` pairs, quoted scalars, flow lists (`[a, b]`), block lists
//! (`- item`, indented or not), nested flow lists inside block lists (joined with `/`,
//! the way hierarchical categories are written), block scalars (`|` and `>`) and comments.
//! One level of nested mapping is kept as a map of texts. Anything else is an error with its line number.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::front_matter::SourceLine;
use crate::content::{FieldValue, RawField};

lazy_static! {
    static ref KEY_REGEX: Regex = Regex::new(
        r"^(?P<key>[A-Za-z0-9_][\w\-. ]*?)\s*:(?:\s+(?P<value>.*))?$"
    ).unwrap();
}

pub fn parse(lines: &[SourceLine]) -> Result<Vec<RawField>, String> {
    let mut fields = vec![];
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        let trimmed = line.text.trim();
        idx += 1;

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if line.text.starts_with(' ') || line.text.starts_with('\t') {
            return Err(format!("Unexpected indentation at line {}", line.number));
        }

        let Some(caps) = KEY_REGEX.captures(line.text.trim_end()) else {
            return Err(format!("Expected 'key: value' at line {}, found '{}'", line.number, trimmed));
        };
        let key = caps.name("key").map_or("", |m| m.as_str());
        let value = caps.name("value").map_or("", |m| m.as_str()).trim();

        let value = match value {
            "" => {
                let (value, consumed) = parse_nested(&lines[idx..])?;
                idx += consumed;
                value
            }
            "|" | "|-" | "|+" | ">" | ">-" | ">+" => {
                let (text, consumed) = block_scalar(&lines[idx..], value.starts_with('>'));
                idx += consumed;
                FieldValue::Scalar(text)
            }
            v if v.starts_with('[') => {
                // Flow lists may span several lines
                let mut flow = v.to_string();
                while !flow_closed(&flow) {
                    let Some(next) = lines.get(idx) else {
                        return Err(format!("Unterminated list starting at line {}", line.number));
                    };
                    flow.push(' ');
                    flow.push_str(next.text.trim());
                    idx += 1;
                }
                FieldValue::List(parse_flow_list(&flow, line.number)?)
            }
            v => scalar(v, line.number)?,
        };

        fields.push(RawField::new(key, value, line.number));
    }

    Ok(fields)
}

/// Value of a key written with nothing after the colon: a block list, a nested mapping or null.
fn parse_nested(lines: &[SourceLine]) -> Result<(FieldValue, usize), String> {
    let mut items = vec![];
    let mut consumed = 0;
    let mut entries = BTreeMap::new();

    for line in lines {
        let trimmed = line.text.trim();
        let indented = line.text.starts_with(' ') || line.text.starts_with('\t');

        if trimmed.is_empty() || trimmed.starts_with('#') {
            consumed += 1;
            continue;
        }

        if trimmed == "-" || trimmed.starts_with("- ") {
            if !entries.is_empty() {
                return Err(format!("Unexpected list item at line {}", line.number));
            }
            let item = trimmed[1..].trim();
            let item = if item.starts_with('[') {
                parse_flow_list(item, line.number)?.join("/")
            } else {
                item_text(scalar(item, line.number)?)
            };
            items.push(item);
            consumed += 1;
            continue;
        }

        if indented && items.is_empty() {
            let Some(caps) = KEY_REGEX.captures(trimmed) else {
                return Err(format!("Expected 'key: value' in mapping at line {}, found '{}'", line.number, trimmed));
            };
            let key = caps.name("key").map_or("", |m| m.as_str());
            let value = caps.name("value").map_or("", |m| m.as_str());
            let value = if value.trim_start().starts_with('[') {
                parse_flow_list(value, line.number)?.join("/")
            } else {
                item_text(scalar(value, line.number)?)
            };
            entries.entry(key.to_string()).or_insert(value);
            consumed += 1;
            continue;
        }

        break;
    }

    // Trailing blank lines belong to whoever comes next
    while consumed > 0 && lines[consumed - 1].text.trim().is_empty() {
        consumed -= 1;
    }

    let value = if !items.is_empty() {
        FieldValue::List(items)
    } else if !entries.is_empty() {
        FieldValue::Map(entries)
    } else {
        FieldValue::Null
    };
    Ok((value, consumed))
}

fn block_scalar(lines: &[SourceLine], folded: bool) -> (String, usize) {
    let mut parts: Vec<&str> = vec![];
    let mut consumed = 0;
    for line in lines {
        let indented = line.text.starts_with(' ') || line.text.starts_with('\t');
        if !indented && !line.text.trim().is_empty() {
            break;
        }
        parts.push(line.text.trim());
        consumed += 1;
    }
    while let Some(last) = parts.last() {
        if !last.is_empty() {
            break;
        }
        parts.pop();
        consumed -= 1;
    }

    let sep = if folded { " " } else { "\n" };
    (parts.join(sep), consumed)
}

fn flow_closed(flow: &str) -> bool {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for c in flow.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

fn parse_flow_list(flow: &str, line: usize) -> Result<Vec<String>, String> {
    let flow = flow.trim();
    let inner = flow.strip_prefix('[')
        .and_then(|f| f.strip_suffix(']'))
        .ok_or_else(|| format!("Malformed list at line {}: {}", line, flow))?;

    if inner.trim().is_empty() {
        return Ok(vec![]);
    }

    let mut items = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0;
    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '[') => {
                depth += 1;
                current.push(c);
            }
            (None, ']') => {
                depth -= 1;
                current.push(c);
            }
            (None, ',') if depth == 0 => {
                items.push(std::mem::take(&mut current));
            }
            (None, c) => current.push(c),
        }
    }
    if quote.is_some() {
        return Err(format!("Unterminated quote in list at line {}", line));
    }
    // A trailing comma does not add an item
    if !current.trim().is_empty() || items.is_empty() {
        items.push(current);
    }

    items.iter()
        .map(|item| {
            let item = item.trim();
            if item.starts_with('[') {
                return parse_flow_list(item, line).map(|nested| nested.join("/"));
            }
            scalar(item, line).map(item_text)
        })
        .collect()
}

/// A list item or mapping entry as plain text.
fn item_text(value: FieldValue) -> String {
    match value {
        FieldValue::Scalar(s) => s,
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Null => String::new(),
        FieldValue::List(l) => l.join("/"),
        FieldValue::Map(_) => String::new(),
    }
}

fn scalar(value: &str, line: usize) -> Result<FieldValue, String> {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('"') {
        return double_quoted(rest, line).map(FieldValue::Scalar);
    }
    if let Some(rest) = value.strip_prefix('\'') {
        return single_quoted(rest, line).map(FieldValue::Scalar);
    }

    let value = strip_comment(value);
    match value {
        "" | "~" | "null" | "Null" | "NULL" => Ok(FieldValue::Null),
        _ => Ok(FieldValue::Scalar(value.to_string())),
    }
}

fn strip_comment(value: &str) -> &str {
    if value.starts_with('#') {
        return "";
    }
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}

fn single_quoted(rest: &str, line: usize) -> Result<String, String> {
    let mut out = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                out.push('\'');
                chars.next();
                continue;
            }
            return trailing_ok(chars.collect::<String>().as_str(), line).map(|_| out);
        }
        out.push(c);
    }
    Err(format!("Unterminated quote at line {}", line))
}

fn double_quoted(rest: &str, line: usize) -> Result<String, String> {
    let mut out = String::new();
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => break,
            },
            '"' => return trailing_ok(chars.as_str(), line).map(|_| out),
            c => out.push(c),
        }
    }
    Err(format!("Unterminated quote at line {}", line))
}

fn trailing_ok(rest: &str, line: usize) -> Result<(), String> {
    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(())
    } else {
        Err(format!("Unexpected text after quoted value at line {}: {}", line, rest))
    }
}
