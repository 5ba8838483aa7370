use std::{fs, io};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 2] = ["md", "markdown"];

pub struct ContentFile {
    pub file_path: PathBuf,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(file_path: &Path) -> io::Result<ContentFile> {
        let raw_content = fs::read_to_string(file_path)
            .map_err(|e| io::Error::new(e.kind(), format!("Error reading {}: {}", file_path.display(), e)))?;

        Ok(ContentFile {
            file_path: file_path.to_path_buf(),
            raw_content,
        })
    }

    /// Case-insensitive extension check, without the leading dot.
    pub fn is_post<S: AsRef<str>>(file_name: &Path, extensions: &[S]) -> bool {
        match file_name.extension().and_then(|e| e.to_str()) {
            Some(ext) => extensions.iter().any(|x| x.as_ref().eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
