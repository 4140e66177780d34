//! CSV report: a one-line summary header, a blank line, then one row per event.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::api::models::WireCode;
use crate::auth::scope::Scope;
use crate::db::models::events::AiEventDBResponse;
use crate::metrics::round_half_up;

pub const COLUMNS: [&str; 13] = [
    "createdAt",
    "team",
    "email",
    "tool",
    "category",
    "timeSaved",
    "rework",
    "outcome",
    "riskPersonal",
    "riskPayment",
    "riskInternal",
    "toolApproved",
    "note",
];

/// Summary figures printed above the detail rows.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub days: i64,
    pub from: DateTime<Utc>,
    pub scope: Scope,
    pub hours_saved: f64,
    pub value_estimate: f64,
}

impl ReportHeader {
    fn record(&self) -> [String; 6] {
        [
            "Support AI ROI Report".to_string(),
            format!("Days={}", self.days),
            format!("From={}", self.from.format("%Y-%m-%d")),
            format!("Scope={}", self.scope.tag()),
            format!("HoursSavedConservative={:.2}", round_half_up(self.hours_saved, 2)),
            format!("ValueGBP={:.2}", round_half_up(self.value_estimate, 2)),
        ]
    }
}

/// Download name for a report covering `days` days.
pub fn report_filename(days: i64) -> String {
    format!("support-ai-roi-{days}d.csv")
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.quote_style(QuoteStyle::Necessary).terminator(Terminator::Any(b'\n'));
    builder
}

fn event_record(event: &AiEventDBResponse) -> [String; 13] {
    [
        event.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        event.team_name.clone().unwrap_or_default(),
        event.user_email.clone(),
        event.tool.code().to_string(),
        event.category_name.clone(),
        event.time_saved.clone(),
        event.rework.code().to_string(),
        event.outcome.code().to_string(),
        event.risk_personal_data.to_string(),
        event.risk_payment_data.to_string(),
        event.risk_internal_info.to_string(),
        event.tool_approved.to_string(),
        event.note.clone().unwrap_or_default(),
    ]
}

/// Write the report. Rows are written in the order given; callers pass them oldest first.
///
/// Fields containing a comma, quote or newline are quoted with inner quotes doubled; all other
/// fields are written bare.
pub fn write_report<W: Write>(mut out: W, header: &ReportHeader, events: &[AiEventDBResponse]) -> csv::Result<()> {
    // The summary line is narrower than the detail rows, and the csv writer cannot emit a truly
    // empty line, so the three sections are written separately.
    {
        let mut summary = writer_builder().from_writer(&mut out);
        summary.write_record(header.record())?;
        summary.flush()?;
    }

    out.write_all(b"\n")?;

    let mut details = writer_builder().from_writer(&mut out);
    details.write_record(COLUMNS)?;
    for event in events {
        details.write_record(event_record(event))?;
    }
    details.flush()?;

    Ok(())
}

/// Render the report to a string.
pub fn render_report(header: &ReportHeader, events: &[AiEventDBResponse]) -> csv::Result<String> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, header, events)?;
    String::from_utf8(buffer).map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::events::{Outcome, ReworkLevel, Tool};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn header() -> ReportHeader {
        ReportHeader {
            days: 7,
            from: Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap(),
            scope: Scope::All,
            hours_saved: 1.5,
            value_estimate: 30.0,
        }
    }

    fn event(note: Option<&str>, team: Option<&str>) -> AiEventDBResponse {
        AiEventDBResponse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: "agent@example.com".to_string(),
            team_name: team.map(str::to_string),
            tool: Tool::ChatGpt,
            category_id: Uuid::new_v4(),
            category_name: "Draft first reply".to_string(),
            time_saved: "M6_10".to_string(),
            rework: ReworkLevel::Some,
            outcome: Outcome::InternalOnly,
            risk_personal_data: true,
            risk_payment_data: false,
            risk_internal_info: false,
            tool_approved: true,
            note: note.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2026, 3, 4, 9, 15, 30).unwrap() + chrono::Duration::milliseconds(250),
        }
    }

    #[test]
    fn test_layout() {
        let csv = render_report(&header(), &[event(Some("plain note"), Some("Support"))]).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(
            lines[0],
            "Support AI ROI Report,Days=7,From=2026-03-03,Scope=ALL,HoursSavedConservative=1.50,ValueGBP=30.00"
        );
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], COLUMNS.join(","));
        assert_eq!(
            lines[3],
            "2026-03-04T09:15:30.250Z,Support,agent@example.com,CHATGPT,Draft first reply,M6_10,SOME,INTERNAL_ONLY,true,false,false,true,plain note"
        );
        assert_eq!(lines[4], "");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_missing_team_and_note_are_empty() {
        let csv = render_report(&header(), &[event(None, None)]).unwrap();
        let row = csv.lines().nth(3).unwrap();
        assert!(row.starts_with("2026-03-04T09:15:30.250Z,,agent@example.com,"));
        assert!(row.ends_with(",true,false,false,true,"));
    }

    #[test]
    fn test_escaping() {
        let csv = render_report(&header(), &[event(Some(r#"Hello, "world""#), None)]).unwrap();
        let row = csv.lines().nth(3).unwrap();
        assert!(row.ends_with(r#","Hello, ""world""""#));
    }

    #[test]
    fn test_newline_in_note_is_quoted() {
        let csv = render_report(&header(), &[event(Some("line one\nline two"), None)]).unwrap();
        assert!(csv.contains("\"line one\nline two\""));
    }

    #[test]
    fn test_header_scope_tags_and_empty_report() {
        let mut h = header();
        h.scope = Scope::Team(Uuid::new_v4());
        h.hours_saved = 0.0;
        h.value_estimate = 0.0;

        let csv = render_report(&h, &[]).unwrap();
        assert!(csv.starts_with("Support AI ROI Report,Days=7,From=2026-03-03,Scope=TEAM,"));
        assert!(csv.contains("HoursSavedConservative=0.00,ValueGBP=0.00"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_header_rounds_halves_up() {
        let mut h = header();
        h.hours_saved = 2.625;
        h.value_estimate = 0.125;

        let csv = render_report(&h, &[]).unwrap();
        assert!(csv.contains("HoursSavedConservative=2.63,ValueGBP=0.13"));
    }

    #[test]
    fn test_filename() {
        assert_eq!(report_filename(30), "support-ai-roi-30d.csv");
    }
}
