use std::{fs, io};
use std::path::{Path, PathBuf};

use spdlog::debug;

use crate::content::content_file::ContentFile;

const DRAFTS_DIR: &str = "_drafts";

/// Finds posts under `root_dir`.
///
/// A post is either a file with one of `extensions` or a directory holding `post_file`
/// (a directory post, which keeps its images next to it). Other directories are searched
/// recursively. Hidden entries and drafts are skipped.
pub struct PostList {
    pub root_dir: PathBuf,
    pub post_file: String,
    pub extensions: Vec<String>,
}

impl PostList {
    pub fn retrieve_posts(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        self.walk(&self.root_dir, &mut posts)?;
        posts.sort();
        debug!("Found {} posts in {}", posts.len(), self.root_dir.display());
        Ok(posts)
    }

    fn walk(&self, dir: &Path, posts: &mut Vec<PathBuf>) -> io::Result<()> {
        let entries = fs::read_dir(dir)
            .map_err(|e| io::Error::new(e.kind(), format!("Error listing {}: {}", dir.display(), e)))?;

        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') || file_name == DRAFTS_DIR {
                continue;
            }

            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                let post_path = path.join(&self.post_file);
                if post_path.is_file() {
                    posts.push(post_path);
                } else {
                    self.walk(&path, posts)?;
                }
            } else if file_type.is_file() && ContentFile::is_post(&path, &self.extensions) {
                posts.push(path);
            }
        }
        Ok(())
    }
}
