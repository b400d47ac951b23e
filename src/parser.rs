pub mod docx;
pub mod pandoc;

use crate::{ConversionConfig, StripPolicy};

const BULLET_MARKER: &str = "* ";
const NUMBERED_MARKER: &str = "1. ";

/// One structural unit of a document, produced from exactly one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    BulletItem(String),
    NumberedItem(String),
    Paragraph(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Heading { text, .. } => text,
            Block::BulletItem(text) | Block::NumberedItem(text) | Block::Paragraph(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document(pub Vec<Block>);

impl Document {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }
}

/// Classifies Markdown-like text line by line.
///
/// Every line yields exactly one [`Block`], so the resulting document has as many
/// blocks as the input has `\n`-separated lines. Parsing never fails.
#[derive(Debug, Clone)]
pub struct LineParser {
    pub max_heading_level: u8,
    pub strip_policy: StripPolicy,
}

impl LineParser {
    pub fn new(cfg: &ConversionConfig) -> Self {
        LineParser {
            max_heading_level: cfg.max_heading_level.max(1),
            strip_policy: cfg.strip_policy,
        }
    }

    pub fn parse(&self, markdown_text: &str) -> Document {
        Document(markdown_text.split('\n').map(|line| self.classify(line)).collect())
    }

    pub fn classify(&self, line: &str) -> Block {
        if line.starts_with('#') {
            let hashes = line.chars().take_while(|&c| c == '#').count();
            let level = hashes.min(self.max_heading_level as usize) as u8;
            let text = line.trim_start_matches('#').trim().to_owned();
            Block::Heading { level, text }
        } else if line.starts_with(BULLET_MARKER) {
            Block::BulletItem(self.strip_marker(line, BULLET_MARKER, &['*', ' ']))
        } else if line.starts_with(NUMBERED_MARKER) {
            Block::NumberedItem(self.strip_marker(line, NUMBERED_MARKER, &['1', '.', ' ']))
        } else {
            Block::Paragraph(line.to_owned())
        }
    }

    fn strip_marker(&self, line: &str, marker: &str, marker_chars: &[char]) -> String {
        match self.strip_policy {
            StripPolicy::LiteralPrefix => line.strip_prefix(marker).unwrap_or(line).to_owned(),
            StripPolicy::CharacterSet => line.trim_start_matches(marker_chars).to_owned(),
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        LineParser::new(&ConversionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Block> {
        LineParser::default().parse(text).0
    }

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_owned(),
        }
    }

    #[test]
    fn empty_input_is_one_empty_paragraph() {
        assert_eq!(parse(""), vec![Block::Paragraph("".to_owned())]);
    }

    #[test]
    fn headings() {
        assert_eq!(parse("# Title"), vec![heading(1, "Title")]);
        assert_eq!(parse("### Sub"), vec![heading(3, "Sub")]);
        assert_eq!(parse("##   Spaced out  "), vec![heading(2, "Spaced out")]);
        assert_eq!(parse("#"), vec![heading(1, "")]);
    }

    #[test]
    fn heading_level_counts_only_leading_hashes() {
        assert_eq!(parse("## C# and F#"), vec![heading(2, "C# and F#")]);
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(parse("############ Deep"), vec![heading(9, "Deep")]);

        let parser = LineParser::new(&ConversionConfig {
            max_heading_level: 3,
            ..Default::default()
        });
        assert_eq!(parser.parse("##### Deep").0, vec![heading(3, "Deep")]);
        assert_eq!(parser.parse("## Shallow").0, vec![heading(2, "Shallow")]);
    }

    #[test]
    fn zero_max_heading_level_is_treated_as_one() {
        let parser = LineParser::new(&ConversionConfig {
            max_heading_level: 0,
            ..Default::default()
        });
        assert_eq!(parser.parse("### Title").0, vec![heading(1, "Title")]);
    }

    #[test]
    fn bullet_items() {
        assert_eq!(
            parse("* item one\n* item two"),
            vec![
                Block::BulletItem("item one".to_owned()),
                Block::BulletItem("item two".to_owned()),
            ]
        );
    }

    #[test]
    fn numbered_items() {
        assert_eq!(
            parse("1. first\n1. second"),
            vec![
                Block::NumberedItem("first".to_owned()),
                Block::NumberedItem("second".to_owned()),
            ]
        );
    }

    #[test]
    fn only_literal_one_marks_a_numbered_item() {
        assert_eq!(parse("2. first"), vec![Block::Paragraph("2. first".to_owned())]);
        assert_eq!(parse("10. tenth"), vec![Block::Paragraph("10. tenth".to_owned())]);
    }

    #[test]
    fn markers_without_trailing_space_are_paragraphs() {
        assert_eq!(parse("*bold*"), vec![Block::Paragraph("*bold*".to_owned())]);
        assert_eq!(parse("1.5 litres"), vec![Block::Paragraph("1.5 litres".to_owned())]);
        assert_eq!(parse("- dash"), vec![Block::Paragraph("- dash".to_owned())]);
    }

    #[test]
    fn literal_prefix_policy_keeps_leading_content() {
        assert_eq!(parse("* * starred"), vec![Block::BulletItem("* starred".to_owned())]);
        assert_eq!(parse("1. 1. again"), vec![Block::NumberedItem("1. again".to_owned())]);
        assert_eq!(parse("1. 15 apples"), vec![Block::NumberedItem("15 apples".to_owned())]);
    }

    #[test]
    fn character_set_policy_strips_marker_runs() {
        let parser = LineParser::new(&ConversionConfig {
            strip_policy: StripPolicy::CharacterSet,
            ..Default::default()
        });
        assert_eq!(
            parser.parse("* * starred").0,
            vec![Block::BulletItem("starred".to_owned())]
        );
        assert_eq!(
            parser.parse("1. 15 apples").0,
            vec![Block::NumberedItem("5 apples".to_owned())]
        );
    }

    #[test]
    fn paragraphs_are_verbatim() {
        assert_eq!(
            parse("  indented text \n\nplain"),
            vec![
                Block::Paragraph("  indented text ".to_owned()),
                Block::Paragraph("".to_owned()),
                Block::Paragraph("plain".to_owned()),
            ]
        );
    }

    #[test]
    fn carriage_returns_are_kept() {
        assert_eq!(
            parse("# Title\r\nbody\r"),
            vec![heading(1, "Title"), Block::Paragraph("body\r".to_owned())]
        );
    }

    #[test]
    fn one_block_per_line_in_order() {
        let inputs = [
            "",
            "\n",
            "\n\n\n",
            "# a\n* b\n1. c\nd",
            "trailing newline\n",
            "mixed\n\n# heading\n\n* bullet\n1. number\n2. not a number\n",
        ];
        for input in inputs {
            let blocks = parse(input);
            assert_eq!(blocks.len(), input.split('\n').count(), "input: {:?}", input);
        }

        let blocks = parse("# a\n* b\n1. c\nd");
        assert_eq!(
            blocks.iter().map(Block::text).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
    }
}
