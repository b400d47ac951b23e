use super::Generator;
use crate::GenerateError;
use crate::parser::{Block, Document};

use pandoc::OutputKind;
use regex::Regex;
use std::fs;
use std::process::Command;

/// Keeps an otherwise empty list item from being dropped by pandoc's DOCX writer.
const EMPTY_RUN_OOXML: &str = "`<w:r/>`{=openxml}";

/// Writes DOCX through pandoc.
///
/// Headings and paragraphs reach pandoc as raw OOXML paragraphs so their text is kept
/// character for character; list items go through Markdown so pandoc sets up numbering.
pub struct PandocDocxGenerator;

impl Generator for PandocDocxGenerator {
    fn generate(&self, document: &Document) -> Result<Vec<u8>, GenerateError> {
        let markdown = render_markdown(document);

        // Removed together with its contents on every return path
        let workdir = tempfile::tempdir()?;
        let md_path = workdir.path().join("document.md");
        let docx_path = workdir.path().join("document.docx");

        fs::write(&md_path, markdown)?;

        let mut pandoc = pandoc::new();
        pandoc.add_input(&md_path);
        pandoc.set_output(OutputKind::File(docx_path.clone()));
        pandoc
            .execute()
            .map_err(|e| GenerateError::PandocError(e.into()))?;

        Ok(fs::read(&docx_path)?)
    }
}

pub fn pandoc_available() -> bool {
    Command::new("pandoc")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Renders blocks as pandoc Markdown in which every block becomes exactly one
/// DOCX paragraph, whatever characters its text contains.
pub fn render_markdown(document: &Document) -> String {
    let punctuation = Regex::new(r"[[:punct:]]").expect("valid regex");

    let mut markdown = String::new();
    let mut previous: Option<&Block> = None;
    for block in document.blocks() {
        if let Some(previous) = previous {
            // Consecutive items of one kind form a single tight list
            let same_list = matches!(
                (previous, block),
                (Block::BulletItem(_), Block::BulletItem(_))
                    | (Block::NumberedItem(_), Block::NumberedItem(_))
            );
            markdown.push_str(if same_list { "\n" } else { "\n\n" });
        }
        markdown.push_str(&render_block(block, &punctuation));
        previous = Some(block);
    }
    markdown.push('\n');
    markdown
}

fn render_block(block: &Block, punctuation: &Regex) -> String {
    match block {
        Block::Heading { level, text } => {
            raw_ooxml(&paragraph_ooxml(Some(&format!("Heading{}", level)), text))
        }
        Block::Paragraph(text) => raw_ooxml(&paragraph_ooxml(None, text)),
        Block::BulletItem(text) => format!("- {}", list_item_text(text, punctuation)),
        Block::NumberedItem(text) => format!("1. {}", list_item_text(text, punctuation)),
    }
}

fn raw_ooxml(xml: &str) -> String {
    format!("```{{=openxml}}\n{}\n```", xml)
}

/// A `<w:p>` holding `text` verbatim, tabs as `<w:tab/>`.
pub fn paragraph_ooxml(style: Option<&str>, text: &str) -> String {
    let mut xml = String::from("<w:p>");
    if let Some(style) = style {
        xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, style));
    }
    if !text.is_empty() {
        xml.push_str("<w:r>");
        for (i, part) in text.split('\t').enumerate() {
            if i > 0 {
                xml.push_str("<w:tab/>");
            }
            if !part.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape_xml(part));
                xml.push_str("</w:t>");
            }
        }
        xml.push_str("</w:r>");
    }
    xml.push_str("</w:p>");
    xml
}

/// Markdown collapses whitespace in list items, so only punctuation is escaped here.
fn list_item_text(text: &str, punctuation: &Regex) -> String {
    if text.trim().is_empty() {
        return EMPTY_RUN_OOXML.to_owned();
    }
    punctuation
        .replace_all(text.trim(), r"\$0")
        .into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            // A literal CR would be normalized away by XML parsers
            '\r' => escaped.push_str("&#13;"),
            // Not representable in XML 1.0
            c if c < ' ' && c != '\t' && c != '\n' => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
