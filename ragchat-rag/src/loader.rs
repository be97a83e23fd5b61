//! Document loaders: turn a corpus path into page-level text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ragchat_core::{RagChatError, Result};
use tracing::{debug, info};

use crate::document::{Document, Page};

/// Page separator emitted by `pdftotext` and most text exporters.
pub const PAGE_BREAK: char = '\u{000C}';

/// Loads a corpus path into an ordered [`Document`].
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Document>;
}

/// Loads UTF-8 text files.
///
/// A file path loads that file. A directory path loads every file with one of
/// the accepted extensions (non-recursive, sorted by file name). Within a file,
/// form feed characters separate pages.
#[derive(Debug, Clone)]
pub struct TextLoader {
    extensions: Vec<String>,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self { extensions: vec!["txt".to_string(), "md".to_string()] }
    }
}

impl TextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accepted file extensions used when loading a directory.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    async fn load_file(&self, path: &Path) -> Result<Vec<Page>> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| loader_error(path, e))?;
        let source = path.display().to_string();
        let pages: Vec<Page> = text
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(i, page)| Page::new(page, i + 1, source.clone()))
            .collect();
        debug!(path = %source, page_count = pages.len(), "loaded file");
        Ok(pages)
    }
}

fn loader_error(path: &Path, e: impl std::fmt::Display) -> RagChatError {
    RagChatError::Loader { path: path.display().to_string(), message: e.to_string() }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self, path: &Path) -> Result<Document> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| loader_error(path, e))?;

        let pages = if metadata.is_dir() {
            let mut files: Vec<PathBuf> = Vec::new();
            let mut entries = tokio::fs::read_dir(path).await.map_err(|e| loader_error(path, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| loader_error(path, e))? {
                let file = entry.path();
                if file.is_file() && self.accepts(&file) {
                    files.push(file);
                }
            }
            files.sort();

            let mut pages = Vec::new();
            for file in &files {
                pages.extend(self.load_file(file).await?);
            }
            pages
        } else {
            self.load_file(path).await?
        };

        info!(path = %path.display(), page_count = pages.len(), "loaded corpus");
        Ok(Document::new(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_pages_on_form_feed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("handbook.txt");
        std::fs::write(&file, "first page\u{000C}second page").unwrap();

        let doc = TextLoader::new().load(&file).await.unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.page(1).unwrap().text, "second page");
        assert_eq!(doc.page(1).unwrap().page_number, 2);
    }

    #[tokio::test]
    async fn loads_matching_files_from_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "bravo").unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("c.pdf"), "skipped").unwrap();

        let doc = TextLoader::new().load(dir.path()).await.unwrap();
        let texts: Vec<&str> = doc.pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "bravo"]);
    }

    #[tokio::test]
    async fn missing_path_is_a_loader_error() {
        let err = TextLoader::new().load(Path::new("/definitely/not/here.txt")).await.unwrap_err();
        assert!(matches!(err, RagChatError::Loader { .. }));
    }
}
