use std::io;
use std::io::ErrorKind;
use std::path::Path;

use crate::content::{HeaderDialect, RawField};
use crate::content::{texted_header, toml_header, yaml_header};

/// A line of the source file with its 1-based number and byte offset.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub offset: usize,
    pub text: &'a str,
}

pub fn source_lines(content: &str) -> Vec<SourceLine<'_>> {
    let mut lines = vec![];
    let mut offset = 0;
    for (idx, chunk) in content.split_inclusive('\n').enumerate() {
        let text = chunk.trim_end_matches('\n').trim_end_matches('\r');
        lines.push(SourceLine { number: idx + 1, offset, text });
        offset += chunk.len();
    }
    lines
}

/// A post file cut in two: the header fields and the body that follows them.
#[derive(Debug)]
pub struct SplitPost<'a> {
    pub dialect: Option<HeaderDialect>,
    pub fields: Vec<RawField>,
    pub body: &'a str,
    /// File line where `body` starts
    pub body_line: usize,
}

fn invalid_data(file_name: &Path, msg: String) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", msg, file_name.display()))
}

fn find_closing(lines: &[SourceLine], from: usize, closers: &[&str]) -> Option<usize> {
    (from..lines.len()).find(|&idx| closers.contains(&lines[idx].text.trim_end()))
}

fn body_from<'a>(content: &'a str, lines: &[SourceLine], idx: usize) -> (&'a str, usize) {
    match lines.get(idx) {
        Some(line) => (&content[line.offset..], line.number),
        None => ("", lines.len() + 1),
    }
}

pub fn split_front_matter<'a>(file_name: &Path, content: &'a str) -> io::Result<SplitPost<'a>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines = source_lines(content);

    // Empty lines before the header are ok
    let Some(first) = lines.iter().position(|l| !l.text.trim().is_empty()) else {
        return Ok(SplitPost { dialect: None, fields: vec![], body: content, body_line: 1 });
    };

    let opener = lines[first].text.trim();
    match opener {
        "---" => {
            let end = find_closing(&lines, first + 1, &["---", "..."]).ok_or_else(|| {
                invalid_data(file_name, format!("Front matter opened at line {} is never closed", lines[first].number))
            })?;
            let fields = yaml_header::parse(&lines[first + 1..end])
                .map_err(|e| invalid_data(file_name, e))?;
            let (body, body_line) = body_from(content, &lines, end + 1);
            Ok(SplitPost { dialect: Some(HeaderDialect::Yaml), fields, body, body_line })
        }
        "+++" => {
            let end = find_closing(&lines, first + 1, &["+++"]).ok_or_else(|| {
                invalid_data(file_name, format!("Front matter opened at line {} is never closed", lines[first].number))
            })?;
            let fields = toml_header::parse(&lines[first + 1..end])
                .map_err(|e| invalid_data(file_name, e))?;
            let (body, body_line) = body_from(content, &lines, end + 1);
            Ok(SplitPost { dialect: Some(HeaderDialect::Toml), fields, body, body_line })
        }
        _ if texted_header::is_texted_start(opener) => {
            let (fields, end) = texted_header::parse(&lines[first..])
                .map_err(|e| invalid_data(file_name, e))?;
            let (body, body_line) = body_from(content, &lines, first + end);
            Ok(SplitPost { dialect: Some(HeaderDialect::Texted), fields, body, body_line })
        }
        _ => Ok(SplitPost { dialect: None, fields: vec![], body: content, body_line: 1 }),
    }
}
