use crate::ParseError;

use pandoc::OutputKind;
use std::fs;

/// Reads a DOCX document back into Markdown text.
pub struct PandocDocxReader;

impl PandocDocxReader {
    pub fn read_markdown(&self, docx: &[u8]) -> Result<String, ParseError> {
        // Removed together with its contents on every return path
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("document.docx");
        let output_path = workdir.path().join("document.md");

        fs::write(&input_path, docx)?;

        let mut pandoc = pandoc::new();
        pandoc.add_input(&input_path);
        pandoc.set_output(OutputKind::File(output_path.clone()));
        pandoc
            .execute()
            .map_err(|e| ParseError::OtherError(e.into()))?;

        Ok(fs::read_to_string(output_path)?)
    }
}
