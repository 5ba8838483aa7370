use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::content::Post;
use crate::lint::{Hit, Rule};

/// Posts sharing the same trimmed title and date. Every post of a group gets a hit naming the others.
pub(crate) fn check_duplicates(posts: &[Post]) -> Vec<(PathBuf, Hit)> {
    let mut groups: BTreeMap<(&str, NaiveDateTime), Vec<&Post>> = BTreeMap::new();
    for post in posts {
        let (Some(title), Some(date)) = (post.title(), post.date()) else {
            continue;
        };
        let title = title.trim();
        if title.is_empty() {
            continue;
        }
        groups.entry((title, *date)).or_default().push(post);
    }

    let mut hits = vec![];
    for ((title, date), group) in groups {
        if group.len() < 2 {
            continue;
        }
        for post in &group {
            let others: Vec<String> = group.iter()
                .map(|p| p.source())
                .filter(|p| *p != post.source())
                .map(|p: &Path| p.display().to_string())
                .collect();
            let message = format!("'{}' dated {} is also used by {}", title, date, others.join(", "));
            let line = post.front_matter().line_of("title");
            hits.push((post.source().to_path_buf(), Hit::new(Rule::DuplicatePost, line, message)));
        }
    }
    hits
}
