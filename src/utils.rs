use chrono::{DateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;

/// First line of `s`, cut to at most `max_len` graphemes, for log messages.
pub fn preview(s: &str, max_len: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    if line.graphemes(true).count() > max_len {
        line.graphemes(true).take(max_len).collect::<String>() + "..."
    } else {
        line.to_owned()
    }
}

/// Time-derived object key, unique as long as two documents aren't stored in the same millisecond.
pub fn object_key(prefix: &str, now: DateTime<Utc>) -> String {
    let prefix = prefix.trim_matches('/');
    let name = format!("{}.docx", now.format("%Y/%m/%d/%H%M%S%3f"));
    if prefix.is_empty() {
        name
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("# Title\nbody", 20), "# Title");
        assert_eq!(preview("", 20), "");
    }

    #[test]
    fn preview_cuts_on_grapheme_boundaries() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("👩‍👩‍👧‍👦👩‍👩‍👧‍👦👩‍👩‍👧‍👦", 2), "👩‍👩‍👧‍👦👩‍👩‍👧‍👦...");
    }

    #[test]
    fn object_key_is_date_partitioned() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap()
            + chrono::Duration::milliseconds(42);

        assert_eq!(object_key("docx", now), "docx/2024/03/07/090501042.docx");
        assert_eq!(object_key("/exports/", now), "exports/2024/03/07/090501042.docx");
        assert_eq!(object_key("", now), "2024/03/07/090501042.docx");
    }
}
