use crate::ParseError;

use regex::{Captures, Regex};
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the text of every body paragraph of a DOCX, exactly as stored.
pub struct DocxTextReader;

impl DocxTextReader {
    pub fn read_paragraphs(&self, docx: &[u8]) -> Result<Vec<String>, ParseError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(docx)).map_err(|e| ParseError::OtherError(e.into()))?;
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ParseError::OtherError(e.into()))?
            .read_to_string(&mut xml)?;

        Ok(paragraph_texts(&xml))
    }
}

fn paragraph_texts(xml: &str) -> Vec<String> {
    let paragraph = Regex::new(r"(?s)<w:p(?:\s[^>]*?)?(?:/>|>(.*?)</w:p>)").expect("valid regex");
    let run_content =
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br/>").expect("valid regex");
    let entity = Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-z]+);").expect("valid regex");

    paragraph
        .captures_iter(xml)
        .map(|p| {
            let body = p.get(1).map_or("", |m| m.as_str());
            run_content
                .captures_iter(body)
                .map(|c| match c.get(1) {
                    Some(text) => unescape_xml(text.as_str(), &entity),
                    None if &c[0] == "<w:tab/>" => "\t".to_owned(),
                    None => "\n".to_owned(),
                })
                .collect::<String>()
        })
        .collect()
}

fn unescape_xml(text: &str, entity: &Regex) -> String {
    entity
        .replace_all(text, |c: &Captures| {
            let name = &c[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = if let Some(hex) = name.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        name.strip_prefix('#').and_then(|dec| dec.parse().ok())
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| c[0].to_owned(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::generator::pandoc::{PandocDocxGenerator, paragraph_ooxml};
    use crate::parser::LineParser;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        write!(
            writer,
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document><w:body>{}<w:sectPr/></w:body></w:document>"#,
            body
        )
        .unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_paragraph_text_verbatim() {
        let body = [
            paragraph_ooxml(Some("Heading1"), "C# & <x>"),
            paragraph_ooxml(None, "  a  b "),
            paragraph_ooxml(None, ""),
            paragraph_ooxml(None, "col1\tcol2"),
            paragraph_ooxml(None, "line\r"),
        ]
        .concat();

        let paragraphs = DocxTextReader.read_paragraphs(&docx_with_body(&body)).unwrap();

        assert_eq!(paragraphs, vec!["C# & <x>", "  a  b ", "", "col1\tcol2", "line\r"]);
    }

    #[test]
    fn joins_runs_and_skips_paragraph_properties() {
        let body = concat!(
            r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="Compact"/><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>item</w:t></w:r><w:r><w:t xml:space="preserve"> one</w:t></w:r></w:p>"#,
            r#"<w:p/>"#,
            r#"<w:p w:rsidR="00A2"/>"#,
            r#"<w:p><w:r><w:t>&#x263A;&#65;&unknown;</w:t><w:br/></w:r></w:p>"#,
        );

        let paragraphs = DocxTextReader.read_paragraphs(&docx_with_body(body)).unwrap();

        assert_eq!(paragraphs, vec!["item one", "", "", "\u{263A}A&unknown;\n"]);
    }

    #[test]
    fn not_a_zip_archive_is_an_error() {
        let result = DocxTextReader.read_paragraphs(b"definitely not a zip archive");

        assert!(matches!(result, Err(ParseError::OtherError(_))));
    }

    #[test]
    fn archive_without_document_part_is_an_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        let docx = writer.finish().unwrap().into_inner();

        assert!(DocxTextReader.read_paragraphs(&docx).is_err());
    }

    #[test]
    #[ignore = "needs pandoc"]
    fn headings_and_paragraphs_round_trip_exactly() {
        let markdown_text = "# C# & <x>\na  b\n  indented\ncol1\tcol2\n### Sub  \n2. not a list\n* item one\n1. step";
        let document = LineParser::default().parse(markdown_text);

        let docx = PandocDocxGenerator.generate(&document).unwrap();
        let paragraphs = DocxTextReader.read_paragraphs(&docx).unwrap();

        assert_eq!(
            paragraphs,
            vec![
                "C# & <x>",
                "a  b",
                "  indented",
                "col1\tcol2",
                "Sub",
                "2. not a list",
                "item one",
                "step",
            ]
        );
        let texts: Vec<_> = document.blocks().iter().map(|b| b.text()).collect();
        assert_eq!(paragraphs, texts);
    }
}
