use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::content::body::Body;
use crate::content::content_file::ContentFile;
use crate::content::front_matter::split_front_matter;
use crate::text_utils::parse_date_time;

pub mod body;
pub mod content_file;
pub mod front_matter;
pub mod texted_header;
pub mod toml_header;
pub mod yaml_header;

/// Which header syntax a post was written with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderDialect {
    /// `---` delimited YAML, as used by Hexo and Jekyll
    Yaml,
    /// `+++` delimited TOML
    Toml,
    /// `[KEY]: # (value)` link references, optionally wrapped in an HTML comment
    Texted,
}

/// A front matter value before it is mapped onto the post schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Scalar(String),
    List(Vec<String>),
    /// One level of nested `key: value` entries
    Map(BTreeMap<String, String>),
}

/// One `key: value` entry as it appears in the header, with its 1-based file line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub key: String,
    pub value: FieldValue,
    pub line: usize,
}

impl RawField {
    pub fn new(key: &str, value: FieldValue, line: usize) -> RawField {
        RawField { key: key.to_string(), value, line }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldIssueKind {
    InvalidDate,
    WrongType,
    Repeated,
}

/// A known field that was present but could not be mapped onto the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: String,
    pub line: usize,
    pub kind: FieldIssueKind,
    pub message: String,
}

/// Entries that hold the path when `image` is written as a mapping.
const IMAGE_PATH_KEYS: [&str; 3] = ["path", "src", "url"];

/// Keys with a meaning in the post schema. Anything else lands in `extra`.
pub const KNOWN_FIELDS: [&str; 9] = ["title", "date", "updated", "categories", "tags", "image", "pin", "toc", "author"];

fn canonical_key(key: &str) -> String {
    let key = key.trim().to_lowercase();
    match key.as_str() {
        "category" => "categories".to_string(),
        "tag" => "tags".to_string(),
        "cover" => "image".to_string(),
        _ => key,
    }
}

/// Typed post metadata. Fields that failed conversion stay unset and are listed in `issues`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    title: Option<String>,
    date: Option<NaiveDateTime>,
    updated: Option<NaiveDateTime>,
    categories: Vec<String>,
    tags: Vec<String>,
    image: Option<String>,
    pin: Option<bool>,
    toc: Option<bool>,
    author: Option<String>,
    extra: BTreeMap<String, FieldValue>,
    lines: BTreeMap<String, usize>,
    issues: Vec<FieldIssue>,
}

impl FrontMatter {
    pub fn from_fields(fields: Vec<RawField>) -> FrontMatter {
        let mut fm = FrontMatter::default();

        for field in fields {
            let key = canonical_key(&field.key);
            if fm.lines.contains_key(&key) {
                fm.issue(&key, field.line, FieldIssueKind::Repeated, "field appears more than once, keeping the first value");
                continue;
            }
            fm.lines.insert(key.clone(), field.line);

            let line = field.line;
            match key.as_str() {
                "title" => fm.title = fm.text(&key, line, field.value),
                "author" => fm.author = fm.text(&key, line, field.value),
                "image" => fm.image = fm.image_path(&key, line, field.value),
                "date" => fm.date = fm.timestamp(&key, line, field.value),
                "updated" => fm.updated = fm.timestamp(&key, line, field.value),
                "categories" => fm.categories = fm.list(&key, line, field.value),
                "tags" => fm.tags = fm.list(&key, line, field.value),
                "pin" => fm.pin = fm.flag(&key, line, field.value),
                "toc" => fm.toc = fm.flag(&key, line, field.value),
                _ => {
                    fm.extra.insert(key, field.value);
                }
            }
        }

        fm
    }

    fn issue(&mut self, field: &str, line: usize, kind: FieldIssueKind, message: &str) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            line,
            kind,
            message: message.to_string(),
        });
    }

    fn text(&mut self, key: &str, line: usize, value: FieldValue) -> Option<String> {
        match value {
            FieldValue::Null => None,
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::List(_) => {
                self.issue(key, line, FieldIssueKind::WrongType, "expected a single value, found a list");
                None
            }
            FieldValue::Map(_) => {
                self.issue(key, line, FieldIssueKind::WrongType, "expected a single value, found a mapping");
                None
            }
        }
    }

    fn image_path(&mut self, key: &str, line: usize, value: FieldValue) -> Option<String> {
        let entries = match value {
            FieldValue::Map(entries) => entries,
            other => return self.text(key, line, other),
        };

        let path = IMAGE_PATH_KEYS.iter().find_map(|k| entries.get(*k));
        if path.is_none() {
            self.issue(key, line, FieldIssueKind::WrongType,
                       &format!("mapping has none of the entries {}", IMAGE_PATH_KEYS.join(", ")));
        }
        path.cloned()
    }

    fn timestamp(&mut self, key: &str, line: usize, value: FieldValue) -> Option<NaiveDateTime> {
        let raw = self.text(key, line, value)?;
        match parse_date_time(&raw) {
            Ok(date) => Some(date),
            Err(e) => {
                self.issue(key, line, FieldIssueKind::InvalidDate, &e);
                None
            }
        }
    }

    fn list(&mut self, key: &str, line: usize, value: FieldValue) -> Vec<String> {
        match value {
            FieldValue::Null => vec![],
            FieldValue::List(items) => items,
            FieldValue::Scalar(s) => vec![s],
            FieldValue::Bool(_) => {
                self.issue(key, line, FieldIssueKind::WrongType, "expected a list of strings, found a boolean");
                vec![]
            }
            FieldValue::Map(_) => {
                self.issue(key, line, FieldIssueKind::WrongType, "expected a list of strings, found a mapping");
                vec![]
            }
        }
    }

    fn flag(&mut self, key: &str, line: usize, value: FieldValue) -> Option<bool> {
        match value {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(b),
            FieldValue::Scalar(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" => Some(true),
                "false" | "no" | "off" => Some(false),
                _ => {
                    self.issue(key, line, FieldIssueKind::WrongType, &format!("expected true or false, found '{}'", s));
                    None
                }
            },
            FieldValue::List(_) | FieldValue::Map(_) => {
                self.issue(key, line, FieldIssueKind::WrongType, "expected true or false");
                None
            }
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn date(&self) -> Option<&NaiveDateTime> {
        self.date.as_ref()
    }

    pub fn updated(&self) -> Option<&NaiveDateTime> {
        self.updated.as_ref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn pin(&self) -> Option<bool> {
        self.pin
    }

    pub fn toc(&self) -> Option<bool> {
        self.toc
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn extra(&self) -> &BTreeMap<String, FieldValue> {
        &self.extra
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Line where a field was declared, using the canonical key (`tags`, `categories`, `image`...)
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.lines.get(key).copied()
    }

    /// Whether the field was written at all, even with an unusable value.
    pub fn has(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }
}

/// A single article: metadata plus body, read once from disk and never modified.
#[derive(Debug, Clone)]
pub struct Post {
    source: PathBuf,
    dialect: Option<HeaderDialect>,
    front_matter: FrontMatter,
    body: Body,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "file={}, date={}, tags={}\ntitle={}\ncontent:\n{}",
               self.source.display(),
               self.date().map(|d| d.to_string()).unwrap_or_default(),
               self.tags().join(" "),
               self.title().unwrap_or_default(),
               self.body.raw()
        )
    }
}

impl Post {
    pub fn from_file(file_name: &Path) -> io::Result<Post> {
        let file = ContentFile::from_file(file_name)?;
        Self::from_string(&file.file_path, &file.raw_content)
    }

    pub fn from_string(file_name: &Path, content: &str) -> io::Result<Post> {
        let split = split_front_matter(file_name, content)?;
        let front_matter = FrontMatter::from_fields(split.fields);
        let body = Body::parse(split.body, split.body_line)?;

        Ok(Post {
            source: file_name.to_path_buf(),
            dialect: split.dialect,
            front_matter,
            body,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// `None` when the file has no header at all
    pub fn dialect(&self) -> Option<HeaderDialect> {
        self.dialect
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn title(&self) -> Option<&str> {
        self.front_matter.title()
    }

    pub fn date(&self) -> Option<&NaiveDateTime> {
        self.front_matter.date()
    }

    pub fn tags(&self) -> &[String] {
        self.front_matter.tags()
    }

    pub fn categories(&self) -> &[String] {
        self.front_matter.categories()
    }

    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags().iter().map(|t| t.as_str()).collect()
    }

    pub fn category_set(&self) -> BTreeSet<&str> {
        self.categories().iter().map(|c| c.as_str()).collect()
    }

    pub fn is_pinned(&self) -> bool {
        self.front_matter.pin().unwrap_or(false)
    }

    pub fn wants_toc(&self) -> bool {
        self.front_matter.toc().unwrap_or(false)
    }
}
