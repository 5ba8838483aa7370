use lazy_static::lazy_static;
use regex::Regex;

use crate::content::front_matter::SourceLine;
use crate::content::{FieldValue, RawField};

lazy_static! {
    static ref HEADER_REGEX: Regex = Regex::new(r"^\[(?P<key>\w+)\]: # \((?P<value>.*)\)\s*$").unwrap();
}

pub fn is_texted_start(line: &str) -> bool {
    line == "<!--" || extract_texted_header(line).is_some()
}

/// Example of header
/// <!--
/// [ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
/// [DATE]: # (2022-04-02 12:05:00.000)
/// [TAGS]: # (rust threads)
/// -->
///
/// # What I learned after 20+ years of software development
///
/// Returns the fields and the index of the first body line. The title heading stays in the body.
pub fn parse(lines: &[SourceLine]) -> Result<(Vec<RawField>, usize), String> {
    let mut fields = vec![];
    let mut idx = 0;

    // Skip optional HTML comment in the beginning
    let start_with_comment = lines.first().map(|l| l.text.trim() == "<!--").unwrap_or(false);
    if start_with_comment {
        idx += 1;
    }

    while let Some(line) = lines.get(idx) {
        let text = line.text.trim();

        // Empty lines are ok
        if text.is_empty() {
            idx += 1;
            continue;
        }

        let Some((key, val)) = extract_texted_header(text) else {
            break;
        };

        let value = match key.to_uppercase().as_str() {
            "TAGS" | "CATEGORIES" => FieldValue::List(extract_tags(val)),
            _ if val.trim().is_empty() => FieldValue::Null,
            _ => FieldValue::Scalar(val.trim().to_string()),
        };
        fields.push(RawField::new(&key.to_lowercase(), value, line.number));
        idx += 1;
    }

    if start_with_comment {
        // Let's find the end of the comment
        loop {
            let Some(line) = lines.get(idx) else {
                let opened = lines.first().map_or(1, |l| l.number);
                return Err(format!("End of comment in the header opened at line {} is missing", opened));
            };
            idx += 1;
            if line.text.trim() == "-->" {
                break;
            }
        }
    }

    if fields.is_empty() {
        return Err("Invalid texted header".to_string());
    }

    // After the header, comes the title
    let has_title = fields.iter().any(|f| f.key == "title");
    if !has_title {
        if let Some(line) = lines[idx..].iter().find(|l| l.text.starts_with("# ")) {
            let title = line.text[2..].trim();
            fields.push(RawField::new("title", FieldValue::Scalar(title.to_string()), line.number));
        }
    }

    Ok((fields, idx))
}

fn extract_tags(tags_str: &str) -> Vec<String> {
    tags_str.split(' ')
        .filter(|x| !x.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn extract_texted_header(line: &str) -> Option<(&str, &str)> {
    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::content::front_matter::source_lines;

    use super::*;

    #[test]
    fn test_extract_texted_header() {
        let res = extract_texted_header("[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)");
        assert_eq!(res, Some(("ID", "a63bd715-a3fe-4788-b0e1-2a3153778544")));
        let res = extract_texted_header("[DATE]: # (2022-04-02 12:05:00.000)");
        assert_eq!(res, Some(("DATE", "2022-04-02 12:05:00.000")));
        let res = extract_texted_header("[TAGS]: # (rust something-else)");
        assert_eq!(res, Some(("TAGS", "rust something-else")));
        let res = extract_texted_header("[TAGS]: # ()");
        assert_eq!(res, Some(("TAGS", "")));

        let res = extract_texted_header("[AUTHOR]: (thiago)");
        assert!(res.is_none());
    }

    #[test]
    fn test_extract_tags() {
        let tags_str = "one two three   four";
        let tags = extract_tags(tags_str);
        assert_eq!(tags, ["one", "two", "three", "four"]);
    }

    #[test]
    fn test_lines_texted() {
        let content = r##"<!--

[ID]: # (21c1e9ad-4ebb-4168-a543-fbf77cc35a85)

[DATE]: # (2024-02-12 22:54:00.000)

[CATEGORIES]: # (Go)

-->

# Scheduling goroutines
Body"##;

        let lines = source_lines(content);
        let (fields, next) = parse(&lines).unwrap();
        assert_eq!(fields, vec![
            RawField::new("id", FieldValue::Scalar("21c1e9ad-4ebb-4168-a543-fbf77cc35a85".to_string()), 3),
            RawField::new("date", FieldValue::Scalar("2024-02-12 22:54:00.000".to_string()), 5),
            RawField::new("categories", FieldValue::List(vec!["Go".to_string()]), 7),
            RawField::new("title", FieldValue::Scalar("Scheduling goroutines".to_string()), 11),
        ]);
        assert_eq!(lines[next].text, "");
        assert_eq!(lines[next].number, 10);
    }

    #[test]
    fn test_without_comment() {
        let lines = source_lines("[DATE]: # (2024-02-12 22:54:00)\n\n# Title\n");
        let (fields, next) = parse(&lines).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(lines[next].text, "# Title");
    }

    #[test]
    fn test_missing_comment_end() {
        let lines = source_lines("<!--\n[DATE]: # (2024-02-12 22:54:00)\n\n# Title\n");
        let err = parse(&lines).unwrap_err();
        assert!(err.contains("End of comment"), "{}", err);

        let lines = source_lines("<!--\nnot a header\n-->\n");
        assert!(parse(&lines).is_err());
    }
}
