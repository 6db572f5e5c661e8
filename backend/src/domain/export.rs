//! CSV export of the review working set.
//!
//! Pure, synchronous text assembly; triggering the actual download is the
//! caller's concern. Rows follow the displayed (filtered) order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::Confession;

/// Fixed CSV column header.
pub const CSV_HEADER: &str = "ID,Content,Date,Sentiment Score,Tags";

/// Render the given records as CSV text.
///
/// - `Content` is always quoted, with embedded `"` doubled per standard CSV
///   escaping; quoting also preserves embedded newlines and commas.
/// - `Date` is ISO-8601 with millisecond precision and a `Z` suffix.
/// - `Sentiment Score` and `Tags` (joined by `;`) are empty strings when the
///   record carries no annotation. A present score of `0` is emitted as `0`.
///
/// Rows are joined by `\n` with no trailing newline.
pub fn render_csv(records: &[Confession]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_owned());
    for record in records {
        lines.push(render_row(record));
    }
    lines.join("\n")
}

/// File name for an export triggered at `now`: `confessions-<epoch-millis>.csv`.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("confessions-{}.csv", now.timestamp_millis())
}

fn render_row(record: &Confession) -> String {
    let (score, tags) = match record.ai_analysis() {
        Some(analysis) => (analysis.sentiment_score.to_string(), analysis.tags.join(";")),
        None => (String::new(), String::new()),
    };

    format!(
        "{id},{content},{date},{score},{tags}",
        id = record.id(),
        content = quote_field(record.content().as_ref()),
        date = record
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

fn quote_field(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{AiAnalysis, ConfessionContent, ConfessionId, SentimentScore};
    use chrono::TimeZone;

    fn record(
        id: &str,
        content: &str,
        millis: i64,
        analysis: Option<AiAnalysis>,
    ) -> Confession {
        Confession::from_parts(
            ConfessionId::new(id).expect("valid id"),
            ConfessionContent::new(content).expect("valid content"),
            Utc.timestamp_millis_opt(millis).single().expect("valid ts"),
            false,
            false,
            analysis,
        )
    }

    fn analysis(score: u8, tags: &[&str]) -> AiAnalysis {
        AiAnalysis {
            sentiment_score: SentimentScore::new(score).expect("valid score"),
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
            summary: "summary".to_owned(),
            risk_flag: false,
        }
    }

    #[test]
    fn empty_set_renders_header_only() {
        assert_eq!(render_csv(&[]), "ID,Content,Date,Sentiment Score,Tags");
    }

    #[test]
    fn doubles_embedded_quotes() {
        let csv = render_csv(&[record("a1", r#"He said "hi""#, 0, None)]);
        let row = csv.lines().nth(1).expect("one data row");
        assert_eq!(row, r#"a1,"He said ""hi""",1970-01-01T00:00:00.000Z,,"#);
    }

    #[test]
    fn quoting_preserves_commas_and_newlines() {
        let csv = render_csv(&[record("a1", "one,two\nthree", 0, None)]);
        assert!(csv.contains("\"one,two\nthree\""));
    }

    #[test]
    fn renders_iso_dates_with_millisecond_precision() {
        let csv = render_csv(&[record("a1", "x", 1_700_000_000_123, None)]);
        assert!(
            csv.contains("2023-11-14T22:13:20.123Z"),
            "unexpected date rendering: {csv}"
        );
    }

    #[test]
    fn annotation_fields_are_empty_when_absent() {
        let csv = render_csv(&[record("a1", "x", 0, None)]);
        let row = csv.lines().nth(1).expect("one data row");
        assert!(row.ends_with(",,"), "absent annotation yields empty columns: {row}");
    }

    #[test]
    fn zero_score_is_emitted_not_blanked() {
        let csv = render_csv(&[record("a1", "x", 0, Some(analysis(0, &["A"])))]);
        let row = csv.lines().nth(1).expect("one data row");
        assert!(row.ends_with(",0,A"), "score 0 must be rendered: {row}");
    }

    #[test]
    fn tags_join_with_semicolons_in_order() {
        let csv = render_csv(&[record(
            "a1",
            "x",
            0,
            Some(analysis(8, &["Kindness", "Neighbors", "Secret"])),
        )]);
        assert!(csv.contains(",8,Kindness;Neighbors;Secret"));
    }

    #[test]
    fn rows_follow_input_order() {
        let csv = render_csv(&[
            record("first", "aaa", 2, None),
            record("second", "bbb", 1, None),
        ]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("first,"));
        assert!(lines[2].starts_with("second,"));
    }

    #[test]
    fn no_trailing_newline() {
        let csv = render_csv(&[record("a1", "x", 0, None)]);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn quoted_row_parses_back_to_the_original_content() {
        // Minimal RFC 4180 field scan over the Content column, standing in
        // for an external CSV reader.
        let original = r#"He said "hi""#;
        let csv = render_csv(&[record("a1", original, 0, None)]);
        let row = csv.lines().nth(1).expect("one data row");

        let after_id = row.split_once(',').expect("id column").1;
        assert!(after_id.starts_with('"'));
        let mut parsed = String::new();
        let mut chars = after_id.chars().skip(1).peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    parsed.push('"');
                } else {
                    break;
                }
            } else {
                parsed.push(c);
            }
        }
        assert_eq!(parsed, original);
    }

    #[test]
    fn filename_embeds_epoch_millis() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("valid ts");
        assert_eq!(export_filename(now), "confessions-1700000000000.csv");
    }
}
