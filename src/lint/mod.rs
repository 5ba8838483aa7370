use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use spdlog::debug;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::content::Post;
use crate::lint::assets::AssetResolver;

pub mod assets;
mod duplicates;
mod rules;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Allow,
    /// Written `warning`. `warn` is accepted when reading config
    #[serde(rename = "warning", alias = "warn")]
    Warn,
    Error,
}

impl Display for LintLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warning",
            LintLevel::Error => "error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    MalformedFrontMatter,
    MissingTitle,
    MissingDate,
    InvalidDate,
    InvalidField,
    EmptyTag,
    DuplicateTag,
    EmptyCategory,
    DuplicateCategory,
    MissingImage,
    DuplicatePost,
    TocWithoutHeadings,
    UpdatedBeforeDate,
    EmptyBody,
    UnknownField,
}

impl Rule {
    pub const ALL: [Rule; 15] = [
        Rule::MalformedFrontMatter,
        Rule::MissingTitle,
        Rule::MissingDate,
        Rule::InvalidDate,
        Rule::InvalidField,
        Rule::EmptyTag,
        Rule::DuplicateTag,
        Rule::EmptyCategory,
        Rule::DuplicateCategory,
        Rule::MissingImage,
        Rule::DuplicatePost,
        Rule::TocWithoutHeadings,
        Rule::UpdatedBeforeDate,
        Rule::EmptyBody,
        Rule::UnknownField,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Rule::MalformedFrontMatter => "malformed-front-matter",
            Rule::MissingTitle => "missing-title",
            Rule::MissingDate => "missing-date",
            Rule::InvalidDate => "invalid-date",
            Rule::InvalidField => "invalid-field",
            Rule::EmptyTag => "empty-tag",
            Rule::DuplicateTag => "duplicate-tag",
            Rule::EmptyCategory => "empty-category",
            Rule::DuplicateCategory => "duplicate-category",
            Rule::MissingImage => "missing-image",
            Rule::DuplicatePost => "duplicate-post",
            Rule::TocWithoutHeadings => "toc-without-headings",
            Rule::UpdatedBeforeDate => "updated-before-date",
            Rule::EmptyBody => "empty-body",
            Rule::UnknownField => "unknown-field",
        }
    }

    pub fn default_level(&self) -> LintLevel {
        match self {
            Rule::TocWithoutHeadings | Rule::UpdatedBeforeDate | Rule::EmptyBody => LintLevel::Warn,
            Rule::UnknownField => LintLevel::Allow,
            _ => LintLevel::Error,
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::ALL.iter()
            .find(|r| r.code() == s)
            .copied()
            .ok_or_else(|| format!("Unknown rule '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub rule: Rule,
    pub level: LintLevel,
    pub message: String,
}

/// What a check found, before a level is attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Hit {
    pub rule: Rule,
    pub line: Option<usize>,
    pub message: String,
}

impl Hit {
    pub fn new(rule: Rule, line: Option<usize>, message: String) -> Hit {
        Hit { rule, line, message }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn new(files: usize, mut findings: Vec<Finding>) -> LintReport {
        findings.sort_by(|a, b| {
            (&a.path, a.line, a.rule).cmp(&(&b.path, b.line, b.rule))
        });
        let errors = findings.iter().filter(|f| f.level == LintLevel::Error).count();
        let warnings = findings.iter().filter(|f| f.level == LintLevel::Warn).count();
        LintReport { files, errors, warnings, findings }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }
}

pub struct Linter {
    levels: HashMap<Rule, LintLevel>,
    assets: AssetResolver,
}

impl Linter {
    pub fn new(config: &Config) -> io::Result<Linter> {
        let assets_dir = config.paths.assets_dir.clone()
            .unwrap_or_else(|| config.paths.posts_dir.clone());
        Self::with_levels(&config.rules, AssetResolver::new(assets_dir))
    }

    pub fn with_levels(overrides: &BTreeMap<String, LintLevel>, assets: AssetResolver) -> io::Result<Linter> {
        let mut levels: HashMap<Rule, LintLevel> = Rule::ALL.iter()
            .map(|r| (*r, r.default_level()))
            .collect();

        for (code, level) in overrides {
            let rule = Rule::from_str(code)
                .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
            levels.insert(rule, *level);
        }

        Ok(Linter { levels, assets })
    }

    pub fn level(&self, rule: Rule) -> LintLevel {
        self.levels.get(&rule).copied().unwrap_or_else(|| rule.default_level())
    }

    fn to_findings(&self, post_path: &Path, hits: Vec<Hit>) -> Vec<Finding> {
        hits.into_iter()
            .filter_map(|hit| {
                let level = self.level(hit.rule);
                if level == LintLevel::Allow {
                    return None;
                }
                Some(Finding {
                    path: post_path.to_path_buf(),
                    line: hit.line,
                    rule: hit.rule,
                    level,
                    message: hit.message,
                })
            })
            .collect()
    }

    pub fn check_post(&self, post: &Post) -> Vec<Finding> {
        let hits = rules::check_post(post, &self.assets);
        self.to_findings(post.source(), hits)
    }

    /// Every per-post check, load failures as `malformed-front-matter` and the (title, date) uniqueness check.
    pub fn check_catalog(&self, catalog: &Catalog) -> LintReport {
        let mut findings = vec![];

        for failure in catalog.failures() {
            let message = failure.error.to_string();
            let hit = Hit::new(Rule::MalformedFrontMatter, line_in_message(&message), message);
            findings.extend(self.to_findings(&failure.path, vec![hit]));
        }

        for post in catalog.posts() {
            let post_findings = self.check_post(post);
            debug!("{}: {} findings", post.source().display(), post_findings.len());
            findings.extend(post_findings);
        }

        for (path, hit) in duplicates::check_duplicates(catalog.posts()) {
            findings.extend(self.to_findings(&path, vec![hit]));
        }

        LintReport::new(catalog.posts().len() + catalog.failures().len(), findings)
    }
}

fn line_in_message(message: &str) -> Option<usize> {
    lazy_static! {
        static ref LINE_REGEX: Regex = Regex::new(r"\bline (\d+)").unwrap();
    }
    LINE_REGEX.captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
