use std::fmt::Write;
use std::path::Path;

use crate::lint::{Finding, LintReport};

fn display_path(path: &Path, base: Option<&Path>) -> String {
    base.and_then(|b| path.strip_prefix(b).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn render_finding(buf: &mut String, finding: &Finding, base: Option<&Path>) {
    let path = display_path(&finding.path, base);
    let location = match finding.line {
        Some(line) => format!("{}:{}", path, line),
        None => path,
    };
    let _ = writeln!(buf, "{}: {}[{}]: {}", location, finding.level, finding.rule, finding.message);
}

/// One `path:line: level[rule]: message` line per finding and a summary line.
/// Paths are shown relative to `base` when they live under it.
pub fn render_text(report: &LintReport, base: Option<&Path>) -> String {
    let mut buf = String::new();

    for finding in &report.findings {
        render_finding(&mut buf, finding, base);
    }

    let _ = writeln!(&mut buf, "{} files checked: {} errors, {} warnings", report.files, report.errors, report.warnings);
    buf
}

pub fn render_json(report: &LintReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::lint::{LintLevel, Rule};

    use super::*;

    fn sample() -> LintReport {
        LintReport::new(2, vec![
            Finding {
                path: PathBuf::from("/blog/posts/a.md"),
                line: Some(3),
                rule: Rule::InvalidDate,
                level: LintLevel::Error,
                message: "date: Unable to parse date time soon".to_string(),
            },
            Finding {
                path: PathBuf::from("/blog/posts/b.md"),
                line: None,
                rule: Rule::EmptyBody,
                level: LintLevel::Warn,
                message: "post has no content".to_string(),
            },
        ])
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample(), Some(Path::new("/blog")));
        assert_eq!(text, r##"posts/a.md:3: error[invalid-date]: date: Unable to parse date time soon
posts/b.md: warning[empty-body]: post has no content
2 files checked: 1 errors, 1 warnings
"##);
    }

    #[test]
    fn test_render_text_without_base() {
        let text = render_text(&LintReport::new(1, vec![]), None);
        assert_eq!(text, "1 files checked: 0 errors, 0 warnings\n");
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"], 2);
        assert_eq!(value["errors"], 1);
        assert_eq!(value["findings"][0]["rule"], "invalid-date");
        assert_eq!(value["findings"][0]["level"], "error");
        assert_eq!(value["findings"][0]["path"], "/blog/posts/a.md");
        assert_eq!(value["findings"][1]["line"], serde_json::Value::Null);
        assert_eq!(value["findings"][1]["level"], "warning");
    }
}
