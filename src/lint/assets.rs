use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Has a scheme or is protocol-relative, not checked
    External,
    Found(PathBuf),
    /// Not found in any of these locations
    Missing(Vec<PathBuf>),
}

/// Resolves image references from a post to files on disk.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    assets_dir: PathBuf,
}

impl AssetResolver {
    pub fn new(assets_dir: PathBuf) -> AssetResolver {
        AssetResolver { assets_dir }
    }

    /// `/x.png` is looked up in the assets dir. Relative references are tried next to the post,
    /// then in the post asset folder and finally in the assets dir.
    pub fn resolve(&self, post_path: &Path, src: &str) -> Resolution {
        if is_external(src) {
            return Resolution::External;
        }

        let src = clean_reference(src);
        if src.is_empty() {
            return Resolution::Missing(vec![]);
        }

        let candidates = if let Some(absolute) = src.strip_prefix('/') {
            vec![self.assets_dir.join(absolute.trim_start_matches('/'))]
        } else {
            vec![
                post_dir(post_path).join(&src),
                asset_folder(post_path).join(&src),
                self.assets_dir.join(&src),
            ]
        };

        first_existing(candidates)
    }

    /// `{% asset_img name %}` names belong to the post asset folder.
    pub fn resolve_asset_tag(&self, post_path: &Path, name: &str) -> Resolution {
        let name = clean_reference(name);
        if name.is_empty() {
            return Resolution::Missing(vec![]);
        }

        first_existing(vec![
            asset_folder(post_path).join(&name),
            post_dir(post_path).join(&name),
        ])
    }
}

fn first_existing(candidates: Vec<PathBuf>) -> Resolution {
    match candidates.iter().find(|c| c.is_file()) {
        Some(found) => Resolution::Found(found.clone()),
        None => Resolution::Missing(candidates),
    }
}

fn post_dir(post_path: &Path) -> &Path {
    post_path.parent().unwrap_or(Path::new(""))
}

/// Sibling directory named after the post file, e.g. `goroutines/` for `goroutines.md`
fn asset_folder(post_path: &Path) -> PathBuf {
    match post_path.file_stem() {
        Some(stem) => post_dir(post_path).join(stem),
        None => post_dir(post_path).to_path_buf(),
    }
}

fn is_external(src: &str) -> bool {
    lazy_static! {
        static ref SCHEME_REGEX: Regex = Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://|data:|mailto:)").unwrap();
    }
    let src = src.trim();
    src.starts_with("//") || SCHEME_REGEX.is_match(src)
}

fn clean_reference(src: &str) -> String {
    let src = src.trim();
    let end = src.find(['?', '#']).unwrap_or(src.len());
    src[..end].replace("%20", " ")
}
