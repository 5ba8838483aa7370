use toml::{Table, Value};

use crate::content::front_matter::SourceLine;
use crate::content::{FieldValue, RawField};
use crate::util::toml_date::TomlDateTime;

pub fn parse(lines: &[SourceLine]) -> Result<Vec<RawField>, String> {
    let first_line = lines.first().map_or(1, |l| l.number);
    let text = lines.iter()
        .map(|l| l.text)
        .collect::<Vec<&str>>()
        .join("\n");

    let table = match toml::from_str::<Table>(&text) {
        Ok(table) => table,
        Err(e) => return Err(format!("Error parsing TOML front matter starting at line {}: {}", first_line, e.message())),
    };

    let mut fields: Vec<RawField> = table.into_iter()
        .map(|(key, value)| {
            let line = key_line(lines, &key).unwrap_or(first_line);
            RawField::new(&key, to_field_value(value), line)
        })
        .collect();
    fields.sort_by_key(|f| f.line);

    Ok(fields)
}

fn key_line(lines: &[SourceLine], key: &str) -> Option<usize> {
    lines.iter()
        .find(|l| {
            let text = l.text.trim();
            if text.strip_prefix('[').and_then(|t| t.strip_suffix(']')).map(str::trim) == Some(key) {
                return true;
            }
            let text = text.strip_prefix('"').unwrap_or(text);
            text.strip_prefix(key)
                .map(|rest| {
                    let rest = rest.strip_prefix('"').unwrap_or(rest).trim_start();
                    rest.starts_with('=')
                })
                .unwrap_or(false)
        })
        .map(|l| l.number)
}

fn to_field_value(value: Value) -> FieldValue {
    match value {
        Value::Boolean(b) => FieldValue::Bool(b),
        Value::Array(items) => FieldValue::List(items.into_iter().map(to_list_item).collect()),
        Value::Table(table) => FieldValue::Map(table.into_iter()
            .map(|(key, value)| (key, to_list_item(value)))
            .collect()),
        other => FieldValue::Scalar(to_text(other)),
    }
}

fn to_list_item(value: Value) -> String {
    match value {
        Value::Array(nested) => nested.into_iter()
            .map(to_list_item)
            .collect::<Vec<String>>()
            .join("/"),
        other => to_text(other),
    }
}

fn to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        // A bare time is left as written so the date check can reject it
        Value::Datetime(dt) => match TomlDateTime::try_from(&dt) {
            Ok(TomlDateTime(naive)) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(_) => dt.to_string(),
        },
        other @ (Value::Array(_) | Value::Table(_)) => other.to_string(),
    }
}
