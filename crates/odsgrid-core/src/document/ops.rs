use super::Document;
use crate::address::CellAddress;
use crate::error::{OdsError, Result};
use crate::ods;
use tracing::{debug, warn};

impl Document {
    /// Set one cell to a string value.
    ///
    /// The edit runs on a copy of the tree; tree, content and model are only
    /// replaced once the new content.xml has been produced. Returns the new
    /// content text.
    pub fn apply_edit(&mut self, address: CellAddress, value: &str) -> Result<&str> {
        let Some(tree) = &self.tree else {
            let reason = self.read_only_reason.clone().unwrap_or_default();
            return Err(OdsError::ReadOnly(reason));
        };

        let mut candidate = tree.clone();
        let content = ods::apply_edit(&mut candidate, address, value).inspect_err(|err| {
            warn!(%address, error = %err, "edit rejected");
        })?;

        self.model = ods::parse_document(&candidate);
        self.tree = Some(candidate);
        self.content = content;
        self.modified = true;
        debug!(%address, "edit applied");
        Ok(&self.content)
    }

    /// [`apply_edit`](Self::apply_edit) with a `"sheet:row:col"` address.
    pub fn apply_edit_str(&mut self, address: &str, value: &str) -> Result<&str> {
        let address: CellAddress = address.parse()?;
        self.apply_edit(address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AddressError, PatchError};

    const CONTENT: &str = r#"<office:document-content><office:body><office:spreadsheet><table:table table:name="A"><table:table-row><table:table-cell office:value-type="float"><text:p>1</text:p></table:table-cell><table:table-cell table:number-columns-repeated="2"><text:p>x</text:p></table:table-cell></table:table-row></table:table><table:table table:name="B"><table:table-row/></table:table></office:spreadsheet></office:body></office:document-content>"#;

    #[test]
    fn test_edit_updates_model_and_content() {
        let mut doc = Document::from_content(CONTENT);
        let content = doc.apply_edit_str("0:0:2", "y").unwrap().to_string();
        assert_eq!(content, doc.content());
        assert!(content.contains("<text:p>y</text:p>"));
        assert_eq!(doc.cell(CellAddress::new(0, 0, 1)).unwrap().value, "x");
        assert_eq!(doc.cell(CellAddress::new(0, 0, 2)).unwrap().value, "y");
        assert!(doc.modified);
    }

    #[test]
    fn test_second_edit_builds_on_first() {
        let mut doc = Document::from_content(CONTENT);
        doc.apply_edit_str("0:0:1", "first").unwrap();
        doc.apply_edit_str("1:0:0", "second").unwrap();
        assert_eq!(doc.cell(CellAddress::new(0, 0, 1)).unwrap().value, "first");
        assert_eq!(doc.cell(CellAddress::new(1, 0, 0)).unwrap().value, "second");
        assert_eq!(doc.model().sheets[0].rows[0].cells.len(), 3);
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let mut doc = Document::from_content(CONTENT);
        let before = doc.clone();

        let err = doc.apply_edit_str("0:0:3", "v").unwrap_err();
        assert!(matches!(
            err,
            OdsError::Patch(PatchError::CellOutOfRange(_))
        ));
        let err = doc.apply_edit_str("zero:0:0", "v").unwrap_err();
        assert!(matches!(err, OdsError::Address(AddressError::Invalid(_))));

        assert_eq!(doc.content(), before.content());
        assert_eq!(doc.model(), before.model());
        assert!(!doc.modified);
    }

    #[test]
    fn test_unparseable_content_is_read_only() {
        let mut doc = Document::from_content("<office:document-content><office:body>");
        assert!(doc.is_read_only());
        assert_eq!(doc.sheet_count(), 1);
        assert!(doc.model().sheets[0].rows[0].cells[0].value.starts_with("Error loading spreadsheet"));
        assert!(matches!(
            doc.apply_edit_str("0:0:0", "v"),
            Err(OdsError::ReadOnly(_))
        ));
    }
}
