use super::Document;
use crate::error::{OdsError, Result};
use crate::storage::{Package, write_csv, write_markdown};
use std::path::{Path, PathBuf};
use tracing::info;

impl Document {
    /// Open an `.ods` file.
    pub fn open(path: &Path) -> Result<Self> {
        let package = Package::open(path)?;
        let content = package.content_xml()?;

        let mut doc = Document::from_content(content);
        doc.package = Some(package);
        doc.file_path = Some(path.to_path_buf());
        info!(path = %path.display(), sheets = doc.sheet_count(), "opened document");
        Ok(doc)
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(OdsError::NoFilePath);
        };
        self.write_package(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        self.write_package(path)?;
        self.file_path = Some(path.to_path_buf());
        Ok(path.to_path_buf())
    }

    fn write_package(&mut self, path: &Path) -> Result<()> {
        let content = &self.content;
        let package = self
            .package
            .get_or_insert_with(|| Package::from_content(content));
        package.set_content_xml(content);
        package.save(path)?;
        self.modified = false;
        info!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Export one sheet to a CSV file
    pub fn export_csv(&self, path: &Path, sheet: usize) -> Result<()> {
        write_csv(path, &self.model, sheet)
    }

    /// Export every sheet to a markdown file
    pub fn export_markdown(&self, path: &Path) -> Result<()> {
        write_markdown(path, &self.model)?;
        Ok(())
    }
}
