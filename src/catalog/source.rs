use std::path::Path;

use anyhow::Context;

use crate::foundation::error::TesseraResult;

/// One uploaded file: a relative path, an optional MIME type and the raw bytes.
///
/// Folder uploads keep their relative path (`<root>/<trait>/<tier>/<file>`); single-file uploads
/// usually carry just the file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Relative path using `/` separators.
    pub path: String,
    /// MIME type reported by the uploader, if any.
    pub mime: Option<String>,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Build a source file without a MIME type.
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into().replace('\\', "/"),
            mime: None,
            bytes,
        }
    }

    /// Attach a MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Whether this file is an image: an `image/*` MIME type, or, without a MIME type, an
    /// extension the decoder recognizes.
    pub fn is_image(&self) -> bool {
        if let Some(mime) = &self.mime {
            return mime.trim().to_ascii_lowercase().starts_with("image/");
        }
        Path::new(self.file_name())
            .extension()
            .and_then(image::ImageFormat::from_extension)
            .is_some()
    }

    /// Read every regular file below `root` into memory.
    ///
    /// Paths are relative to `root`'s parent, so the first segment is the root directory name.
    /// Output is sorted by path.
    pub fn walk_dir(root: &Path) -> TesseraResult<Vec<SourceFile>> {
        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assets".to_string());

        let mut out = Vec::new();
        let mut stack = vec![(root.to_path_buf(), root_name)];
        while let Some((dir, rel)) = stack.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("read asset dir '{}'", dir.display()))?;
            for entry in entries {
                let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
                let path = entry.path();
                let child_rel = format!("{rel}/{}", entry.file_name().to_string_lossy());
                let file_type = entry
                    .file_type()
                    .with_context(|| format!("stat '{}'", path.display()))?;
                if file_type.is_dir() {
                    stack.push((path, child_rel));
                } else if file_type.is_file() {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("read asset '{}'", path.display()))?;
                    out.push(SourceFile::new(child_rel, bytes));
                }
            }
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/source.rs"]
mod tests;
