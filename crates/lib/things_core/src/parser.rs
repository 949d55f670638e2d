//! Parsers for the `|`-delimited line output of the Things scripts.
//!
//! List parsers skip malformed lines with a warning unless
//! [`ParseOptions::strict`] is set, in which case the first malformed line is
//! an error. The detail parser has no skip fallback: missing identity fields
//! are always an error.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::error::ExecutionError;

const FIELD_SEPARATOR: char = '|';
const DETAIL_FIELD_COUNT: usize = 11;

/// `Monday, June 3, 2025 at 12:00:00 AM` and similar.
static VERBOSE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z]+,\s*)?([A-Za-z]+)\s+(\d{1,2}),\s*(\d{4})")
        .expect("static regex is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line {line} has invalid format (expected at least {expected} parts): \"{content}\"")]
    InvalidFormat {
        line: usize,
        expected: usize,
        content: String,
    },

    #[error("Line {line} missing required fields (id/name): \"{content}\"")]
    MissingFields { line: usize, content: String },

    #[error("Empty output for todo details")]
    EmptyDetails,

    #[error("Missing required fields (id/name) in todo details")]
    DetailsMissingFields,

    #[error("Todo details has invalid format (expected {expected} parts, got {actual})")]
    DetailsFieldCount { expected: usize, actual: usize },
}

impl From<ParseError> for ExecutionError {
    fn from(err: ParseError) -> Self {
        ExecutionError::generic(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub tags: Vec<String>,
}

/// Projects are listed in the same layout as to-dos.
pub type ProjectSummary = TodoSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDetails {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field.map(str::trim).filter(|f| !f.is_empty()).map(str::to_string)
}

fn split_tags(field: Option<&str>) -> Vec<String> {
    field
        .map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Shared line loop: blank lines are ignored, line numbers count the
/// remaining lines from 1.
fn parse_lines<T>(
    output: &str,
    options: ParseOptions,
    min_parts: usize,
    build: impl Fn(&str, &str, &[&str]) -> T,
) -> Result<Vec<T>, ParseError> {
    let mut records = Vec::new();

    for (index, line) in output.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        let problem = if parts.len() < min_parts {
            Some(ParseError::InvalidFormat {
                line: index + 1,
                expected: min_parts,
                content: line.to_string(),
            })
        } else if parts[0].trim().is_empty() || parts[1].trim().is_empty() {
            Some(ParseError::MissingFields {
                line: index + 1,
                content: line.to_string(),
            })
        } else {
            None
        };

        match problem {
            Some(err) if options.strict => return Err(err),
            Some(err) => warn!("Parser warning: {err}"),
            None => records.push(build(parts[0].trim(), parts[1].trim(), &parts[2..])),
        }
    }

    Ok(records)
}

/// `id|name|area[|tag,tag]` per line.
pub fn parse_todo_list(output: &str, options: ParseOptions) -> Result<Vec<TodoSummary>, ParseError> {
    parse_lines(output, options, 3, |id, name, rest| TodoSummary {
        id: id.to_string(),
        name: name.to_string(),
        area: non_empty(rest.first().copied()),
        tags: split_tags(rest.get(1).copied()),
    })
}

pub fn parse_project_list(
    output: &str,
    options: ParseOptions,
) -> Result<Vec<ProjectSummary>, ParseError> {
    parse_todo_list(output, options)
}

/// `id|name` per line.
pub fn parse_area_list(output: &str, options: ParseOptions) -> Result<Vec<Area>, ParseError> {
    parse_lines(output, options, 2, |id, name, _| Area {
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// `id|name[|parent]` per line.
pub fn parse_tag_list(output: &str, options: ParseOptions) -> Result<Vec<Tag>, ParseError> {
    parse_lines(output, options, 2, |id, name, rest| Tag {
        id: id.to_string(),
        name: name.to_string(),
        parent: non_empty(rest.first().copied()),
    })
}

/// Parse the single-line detail record:
/// `id|name|area|tags|deadline|scheduled|status|created|completed|project|notes`.
///
/// Fields past the eleventh belong to the notes, which may contain `|`.
pub fn parse_todo_details(output: &str, options: ParseOptions) -> Result<TodoDetails, ParseError> {
    let line = output.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyDetails);
    }

    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() < DETAIL_FIELD_COUNT {
        let err = ParseError::DetailsFieldCount {
            expected: DETAIL_FIELD_COUNT,
            actual: parts.len(),
        };
        if options.strict {
            return Err(err);
        }
        warn!("Parser warning: {err}");
    }

    let field = |i: usize| parts.get(i).copied();
    let id = non_empty(field(0));
    let name = non_empty(field(1));
    let (Some(id), Some(name)) = (id, name) else {
        return Err(ParseError::DetailsMissingFields);
    };

    let notes = if parts.len() > DETAIL_FIELD_COUNT {
        non_empty(Some(parts[DETAIL_FIELD_COUNT - 1..].join("|").as_str()))
    } else {
        non_empty(field(10))
    };

    Ok(TodoDetails {
        id,
        name,
        area: non_empty(field(2)),
        tags: split_tags(field(3)),
        deadline: non_empty(field(4)).map(|d| normalize_date(&d)),
        scheduled_date: non_empty(field(5)).map(|d| normalize_date(&d)),
        status: non_empty(field(6)).unwrap_or_else(|| "open".to_string()),
        creation_date: non_empty(field(7)).map(|d| normalize_date(&d)),
        completion_date: non_empty(field(8)).map(|d| normalize_date(&d)),
        project: non_empty(field(9)),
        notes,
    })
}

/// Convert a script date to `YYYY-MM-DD`, or return it unchanged.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Some(caps) = VERBOSE_DATE.captures(raw) {
        let phrase = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        if let Ok(date) = NaiveDate::parse_from_str(&phrase, "%B %d %Y") {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.date().format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn todo_list_parses_valid_lines() {
        let input = "ABC-123|Task 1|Work|urgent,high\nDEF-456|Task 2||low\nGHI-789|Task 3|Personal|";
        let todos = parse_todo_list(input, ParseOptions::default()).unwrap();
        assert_eq!(
            todos,
            vec![
                TodoSummary {
                    id: "ABC-123".into(),
                    name: "Task 1".into(),
                    area: Some("Work".into()),
                    tags: vec!["urgent".into(), "high".into()],
                },
                TodoSummary {
                    id: "DEF-456".into(),
                    name: "Task 2".into(),
                    area: None,
                    tags: vec!["low".into()],
                },
                TodoSummary {
                    id: "GHI-789".into(),
                    name: "Task 3".into(),
                    area: Some("Personal".into()),
                    tags: vec![],
                },
            ]
        );
    }

    #[test]
    fn empty_output_is_an_empty_list() {
        assert!(parse_todo_list("", ParseOptions::default()).unwrap().is_empty());
        assert!(parse_todo_list("\n\n", ParseOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn lenient_mode_skips_malformed_lines() {
        let input = "ABC-123|Task 1|Work|urgent,high\nINVALID\nDEF-456|Task 2||low";
        let todos = parse_todo_list(input, ParseOptions::default()).unwrap();
        let ids: Vec<_> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ABC-123", "DEF-456"]);

        let input = "|Missing ID||\nABC-789||Work|\nOK-1|Fine|";
        let todos = parse_todo_list(input, ParseOptions::default()).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].name, "Fine");
    }

    #[test]
    fn strict_mode_fails_on_first_malformed_line() {
        let input = "ABC-123|Task 1|Work|urgent,high\nINVALID\nDEF-456|Task 2||low";
        let err = parse_todo_list(input, ParseOptions::strict()).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidFormat {
                line: 2,
                expected: 3,
                content: "INVALID".into(),
            }
        );
        assert!(err.to_string().starts_with("Line 2 has invalid format"));
    }

    #[test]
    fn fields_and_tags_are_trimmed() {
        let todos = parse_todo_list(
            "  ABC-123  |  Task Name  |  Area Name  |  tag1 , tag2  ",
            ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(todos[0].area.as_deref(), Some("Area Name"));
        assert_eq!(todos[0].tags, vec!["tag1", "tag2"]);

        let todos = parse_todo_list("ABC-123|Task|Area|,,  ,", ParseOptions::default()).unwrap();
        assert!(todos[0].tags.is_empty());
    }

    #[test]
    fn area_and_tag_lists_need_two_fields() {
        let areas = parse_area_list("A1|Work\nbad\nA2|Home", ParseOptions::default()).unwrap();
        assert_eq!(areas.len(), 2);

        let tags = parse_tag_list("T1|urgent|\nT2|home|  \nT3|child|T1", ParseOptions::default())
            .unwrap();
        assert_eq!(tags[0].parent, None);
        assert_eq!(tags[1].parent, None);
        assert_eq!(tags[2].parent.as_deref(), Some("T1"));
    }

    #[test]
    fn details_parse_complete_record() {
        let input = "TBeaUrcGH1zKoMmS7wwHVD|Gerar invoice da Happily|Finanças|work,invoice|Monday, June 3, 2025 at 12:00:00 AM|Sunday, June 1, 2025 at 12:00:00 AM|open|Friday, May 30, 2025 at 10:00:00 AM||Work Project|Need to generate the monthly invoice for client";
        let details = parse_todo_details(input, ParseOptions::default()).unwrap();
        assert_eq!(
            details,
            TodoDetails {
                id: "TBeaUrcGH1zKoMmS7wwHVD".into(),
                name: "Gerar invoice da Happily".into(),
                area: Some("Finanças".into()),
                tags: vec!["work".into(), "invoice".into()],
                deadline: Some("2025-06-03".into()),
                scheduled_date: Some("2025-06-01".into()),
                status: "open".into(),
                creation_date: Some("2025-05-30".into()),
                completion_date: None,
                project: Some("Work Project".into()),
                notes: Some("Need to generate the monthly invoice for client".into()),
            }
        );
    }

    #[test]
    fn details_minimal_record_defaults_status() {
        let details = parse_todo_details("ABC123|Simple Task|||||||||", ParseOptions::default())
            .unwrap();
        assert_eq!(
            details,
            TodoDetails {
                id: "ABC123".into(),
                name: "Simple Task".into(),
                area: None,
                tags: vec![],
                deadline: None,
                scheduled_date: None,
                status: "open".into(),
                creation_date: None,
                completion_date: None,
                project: None,
                notes: None,
            }
        );
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json, serde_json::json!({
            "id": "ABC123", "name": "Simple Task", "tags": [], "status": "open"
        }));
    }

    #[test]
    fn details_errors_are_never_skipped() {
        assert_eq!(
            parse_todo_details("", ParseOptions::default()).unwrap_err(),
            ParseError::EmptyDetails
        );
        let err = parse_todo_details("|Missing Name|Area|tags|||||||", ParseOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields (id/name) in todo details");
    }

    #[test]
    fn details_short_record_warns_unless_strict() {
        let details = parse_todo_details("ABC123|Task Name|Area", ParseOptions::default()).unwrap();
        assert_eq!(details.name, "Task Name");
        assert_eq!(details.area.as_deref(), Some("Area"));

        assert!(parse_todo_details("ABC123|Task Name|Area", ParseOptions::strict()).is_err());
    }

    #[test]
    fn details_surplus_fields_join_into_notes() {
        let input = "ID1|Task|||||open||||a | b | c";
        let details = parse_todo_details(input, ParseOptions::default()).unwrap();
        assert_eq!(details.notes.as_deref(), Some("a | b | c"));
    }

    #[test]
    fn unparseable_dates_pass_through() {
        let details = parse_todo_details(
            "ABC123|Task|Area||invalid-date|another-invalid|||||",
            ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(details.deadline.as_deref(), Some("invalid-date"));
        assert_eq!(details.scheduled_date.as_deref(), Some("another-invalid"));
    }

    #[test]
    fn normalize_date_handles_common_forms() {
        assert_eq!(normalize_date("Saturday, June 1, 2025 at 3:00:00 PM"), "2025-06-01");
        assert_eq!(normalize_date("December 24, 2024"), "2024-12-24");
        assert_eq!(normalize_date("2025-01-02T10:00:00Z"), "2025-01-02");
        assert_eq!(normalize_date("2025-01-02"), "2025-01-02");
        assert_eq!(normalize_date("someday"), "someday");
    }
}
