//! The `.ods` ZIP package.
//!
//! Every archive entry is held in memory in its original order so that a
//! save only changes `content.xml`.

use crate::error::{OdsError, Result};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

pub const CONTENT_XML: &str = "content.xml";
pub const MIMETYPE: &str = "mimetype";
pub const MANIFEST: &str = "META-INF/manifest.xml";
pub const ODS_MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

impl Entry {
    fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// An unpacked ODF spreadsheet package.
#[derive(Clone, Debug)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read a package from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let package = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), entries = package.entries.len(), "opened package");
        Ok(package)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
            });
        }

        let package = Package { entries };
        if package.entry(CONTENT_XML).is_none() {
            return Err(OdsError::MissingContent);
        }
        Ok(package)
    }

    /// A minimal package wrapping the given content.xml.
    pub fn from_content(content_xml: &str) -> Self {
        let entries = vec![
            Entry {
                name: MIMETYPE.to_string(),
                data: ODS_MIMETYPE.as_bytes().to_vec(),
                compression: CompressionMethod::Stored,
            },
            Entry {
                name: CONTENT_XML.to_string(),
                data: content_xml.as_bytes().to_vec(),
                compression: CompressionMethod::Deflated,
            },
            Entry {
                name: MANIFEST.to_string(),
                data: minimal_manifest().into_bytes(),
                compression: CompressionMethod::Deflated,
            },
        ];
        Package { entries }
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Names of all entries, in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Raw bytes of an entry.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.entry(name).map(|e| e.data.as_slice())
    }

    pub fn content_xml(&self) -> Result<String> {
        let data = self.file(CONTENT_XML).ok_or(OdsError::MissingContent)?;
        Ok(String::from_utf8(data.to_vec())?)
    }

    pub fn set_content_xml(&mut self, xml: &str) {
        match self.entries.iter_mut().find(|e| e.name == CONTENT_XML) {
            Some(entry) => entry.data = xml.as_bytes().to_vec(),
            None => self.entries.push(Entry {
                name: CONTENT_XML.to_string(),
                data: xml.as_bytes().to_vec(),
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    /// Build the archive: `mimetype` first and stored, everything else in
    /// its original order and compression.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mimetype = self
            .file(MIMETYPE)
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| ODS_MIMETYPE.as_bytes().to_vec());
        writer.start_file(MIMETYPE, stored)?;
        writer.write_all(&mimetype)?;

        for entry in self.entries.iter().filter(|e| e.name != MIMETYPE) {
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            if entry.is_dir() {
                writer.add_directory(entry.name.as_str(), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&entry.data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to `path`, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.ods".to_string());
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp, &bytes)?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!(path = %path.display(), bytes = bytes.len(), "saved package");
        Ok(())
    }
}

fn minimal_manifest() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
  <manifest:file-entry manifest:full-path="/" manifest:version="1.3" manifest:media-type="{}"/>
  <manifest:file-entry manifest:full-path="{}" manifest:media-type="text/xml"/>
</manifest:manifest>
"#,
        ODS_MIMETYPE, CONTENT_XML
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content><office:body><office:spreadsheet/></office:body></office:document-content>"#;

    #[test]
    fn test_mimetype_is_first_and_stored() {
        let bytes = Package::from_content(CONTENT).to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), MIMETYPE);
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);
        // ODF readers sniff the mimetype name at a fixed offset.
        assert_eq!(&bytes[30..38], b"mimetype");
    }

    #[test]
    fn test_save_and_reopen_keeps_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.ods");

        let mut package = Package::from_content(CONTENT);
        package.save(&path).unwrap();

        let mut reopened = Package::open(&path).unwrap();
        assert_eq!(reopened.content_xml().unwrap(), CONTENT);
        reopened.set_content_xml("<changed/>");
        reopened.save(&path).unwrap();

        package = Package::open(&path).unwrap();
        assert_eq!(package.content_xml().unwrap(), "<changed/>");
        let names: Vec<&str> = package.entry_names().collect();
        assert_eq!(names, vec![MIMETYPE, CONTENT_XML, MANIFEST]);
        assert!(package.file(MANIFEST).is_some());
        assert!(!dir.path().join(".book.ods.tmp").exists());
    }

    #[test]
    fn test_archive_without_content_is_rejected() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(MIMETYPE, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(ODS_MIMETYPE.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            Package::from_bytes(&bytes),
            Err(OdsError::MissingContent)
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            Package::from_bytes(b"plain text"),
            Err(OdsError::Zip(_))
        ));
    }
}
