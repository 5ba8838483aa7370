use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use spdlog::{debug, warn};

use crate::content::Post;

/// A post file that could not be read or parsed.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Every post of a blog. Posts that fail to load are kept aside so one broken file never hides the others.
pub struct Catalog {
    posts: Vec<Post>,
    failures: Vec<LoadFailure>,
    post_file_name: String,
}

impl Catalog {
    pub fn load(paths: &[PathBuf], post_file_name: &str) -> Catalog {
        let mut catalog = Catalog::new(post_file_name);
        for path in paths {
            match Post::from_file(path) {
                Ok(post) => catalog.posts.push(post),
                Err(error) => {
                    warn!("Unable to load {}: {}", path.display(), error);
                    catalog.failures.push(LoadFailure { path: path.clone(), error });
                }
            }
        }
        debug!("Loaded {} posts, {} failures", catalog.posts.len(), catalog.failures.len());
        catalog
    }

    pub fn new(post_file_name: &str) -> Catalog {
        Catalog {
            posts: Default::default(),
            failures: Default::default(),
            post_file_name: post_file_name.to_string(),
        }
    }

    pub fn add(&mut self, post: Post) {
        self.posts.push(post);
    }

    /// Posts in load order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Pinned first, then newest first, then by title. Undated posts go last.
    pub fn sorted(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| compare_posts(a, b));
        posts
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Post> {
        self.sorted().into_iter()
            .filter(|p| p.tags().iter().any(|t| t.trim().eq_ignore_ascii_case(tag.trim())))
            .collect()
    }

    pub fn find_by_category(&self, category: &str) -> Vec<&Post> {
        self.sorted().into_iter()
            .filter(|p| p.categories().iter().any(|c| c.trim().eq_ignore_ascii_case(category.trim())))
            .collect()
    }

    /// Number of posts carrying each tag. A tag repeated inside one post counts once.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        count_labels(self.posts.iter().map(|p| p.tag_set()))
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        count_labels(self.posts.iter().map(|p| p.category_set()))
    }

    /// The name a post is published under: the directory name for directory posts, the file stem otherwise.
    pub fn link_of(&self, path: &Path) -> io::Result<String> {
        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            return Err(io::Error::new(ErrorKind::InvalidInput, "Invalid post path"));
        };

        let named = if file_name == self.post_file_name {
            // Directory post, the link is the directory
            path.parent().and_then(|p| p.file_name())
        } else {
            path.file_stem()
        };

        named.and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, format!("Could not find post link for {}", path.display())))
    }
}

fn compare_posts(a: &Post, b: &Post) -> Ordering {
    b.is_pinned().cmp(&a.is_pinned())
        .then_with(|| match (a.date(), b.date()) {
            (Some(da), Some(db)) => db.cmp(da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.title().unwrap_or_default().cmp(b.title().unwrap_or_default()))
}

fn count_labels<'a, I, S>(sets: I) -> BTreeMap<String, usize>
    where
        I: Iterator<Item=S>,
        S: IntoIterator<Item=&'a str>,
{
    let mut counts = BTreeMap::new();
    for set in sets {
        for label in set {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn post(path: &str, header: &str) -> Post {
        let content = format!("---\n{}\n---\nText\n", header);
        Post::from_string(Path::new(path), &content).unwrap()
    }

    fn sample() -> Catalog {
        let mut catalog = Catalog::new("index.md");
        catalog.add(post("old.md", "title: Old\ndate: 2019-01-01\ntags: [go, Threads]"));
        catalog.add(post("undated.md", "title: Undated\ntags: [go]"));
        catalog.add(post("new.md", "title: New\ndate: 2022-01-01\ntags: [rust, go, go]\ncategories: [Essays]"));
        catalog.add(post("pinned.md", "title: Pinned\ndate: 2018-01-01\npin: true\ncategories: [essays]"));
        catalog
    }

    fn titles(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.title().unwrap_or_default().to_string()).collect()
    }

    #[test]
    fn test_sorted() {
        let catalog = sample();
        assert_eq!(titles(&catalog.sorted()), ["Pinned", "New", "Old", "Undated"]);
    }

    #[test]
    fn test_find() {
        let catalog = sample();
        assert_eq!(titles(&catalog.find_by_tag("GO")), ["New", "Old", "Undated"]);
        assert_eq!(titles(&catalog.find_by_category("Essays")), ["Pinned", "New"]);
        assert!(catalog.find_by_tag("python").is_empty());
    }

    #[test]
    fn test_counts() {
        let catalog = sample();
        let tags = catalog.tag_counts();
        assert_eq!(tags.get("go"), Some(&3));
        assert_eq!(tags.get("rust"), Some(&1));
        assert_eq!(tags.get("Threads"), Some(&1));

        let categories = catalog.category_counts();
        assert_eq!(categories.get("Essays"), Some(&1));
        assert_eq!(categories.get("essays"), Some(&1));
    }

    #[test]
    fn test_extract_link() {
        let catalog = Catalog::new("index.md");
        let file_name = PathBuf::from("posts/20200522_how_to_write_a_code_review/index.md");
        assert_eq!(catalog.link_of(&file_name).unwrap(), "20200522_how_to_write_a_code_review");

        let file_name = PathBuf::from("posts/goroutines.md");
        assert_eq!(catalog.link_of(&file_name).unwrap(), "goroutines");
    }

    #[test]
    fn test_load_keeps_failures() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("good.md");
        let broken = dir.path().join("broken.md");
        fs::write(&good, "---\ntitle: Good\ndate: 2020-01-01\n---\nText\n")?;
        fs::write(&broken, "---\ntitle: Broken\n")?;

        let catalog = Catalog::load(&[good.clone(), broken.clone(), dir.path().join("gone.md")], "index.md");
        assert_eq!(catalog.posts().len(), 1);
        assert_eq!(catalog.posts()[0].source(), good.as_path());

        let failed: Vec<&Path> = catalog.failures().iter().map(|f| f.path.as_path()).collect();
        assert_eq!(failed, [broken.as_path(), dir.path().join("gone.md").as_path()]);
        assert_eq!(catalog.failures()[0].error.kind(), ErrorKind::InvalidData);
        Ok(())
    }
}
