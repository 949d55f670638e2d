//! Shared argument schema fragments.

use things_core::schema::{Field, Schema};

pub const WHEN_KEYWORDS: [&str; 5] = ["today", "tomorrow", "evening", "anytime", "someday"];

pub const LISTS: [&str; 7] = [
    "inbox", "today", "upcoming", "anytime", "someday", "logbook", "trash",
];

pub const MAX_RESULTS_LIMIT: f64 = 500.0;

pub fn title() -> Schema {
    Schema::string()
        .min_len(1, "Title is required")
        .max_len(255, "Title too long")
}

pub fn notes() -> Schema {
    Schema::string().max_len(10_000, "Notes too long")
}

pub fn date() -> Schema {
    Schema::string().pattern(r"^\d{4}-\d{2}-\d{2}$", "Invalid date format. Use YYYY-MM-DD")
}

pub fn date_time() -> Schema {
    Schema::string().pattern(
        r"^\d{4}-\d{2}-\d{2}@\d{2}:\d{2}$",
        "Invalid datetime format. Use YYYY-MM-DD@HH:MM",
    )
}

pub fn when() -> Schema {
    Schema::union(vec![Schema::enumeration(WHEN_KEYWORDS), date(), date_time()])
        .describe("When to schedule: today, tomorrow, evening, anytime, someday, YYYY-MM-DD or YYYY-MM-DD@HH:MM")
}

pub fn tags() -> Schema {
    Schema::array(Schema::string().max_len(50, "Tag too long"))
        .max_items(20, "Too many tags")
        .describe("Tag names")
}

pub fn short_text(what: &str) -> Schema {
    Schema::string().max_len(255, format!("{what} too long"))
}

pub fn max_results() -> Field {
    Field::optional(
        "max_results",
        Schema::integer()
            .min(1.0, "max_results must be at least 1")
            .max(MAX_RESULTS_LIMIT, "max_results must be at most 500")
            .describe("Maximum number of results to return"),
    )
}

fn checklist_entry() -> Schema {
    Schema::object(vec![
        Field::required(
            "title",
            Schema::string()
                .min_len(1, "Checklist item title is required")
                .max_len(255, "Title too long"),
        ),
        Field::optional("completed", Schema::boolean()).with_default(false),
    ])
}

fn project_todo() -> Schema {
    Schema::object(vec![
        Field::required("type", Schema::literal("todo")),
        Field::required(
            "title",
            Schema::string()
                .min_len(1, "Todo title is required")
                .max_len(255, "Title too long"),
        ),
        Field::optional("notes", notes()),
        Field::optional("when", when()),
        Field::optional("deadline", date()),
        Field::optional("tags", tags()),
        Field::optional("completed", Schema::boolean()),
        Field::optional("canceled", Schema::boolean()),
        Field::optional(
            "checklist",
            Schema::array(checklist_entry()).max_items(100, "Too many checklist items"),
        ),
    ])
}

fn project_heading() -> Schema {
    Schema::object(vec![
        Field::required("type", Schema::literal("heading")),
        Field::required(
            "title",
            Schema::string()
                .min_len(1, "Heading title is required")
                .max_len(255, "Title too long"),
        ),
        Field::optional("archived", Schema::boolean()).with_default(false),
        Field::optional(
            "items",
            Schema::array(project_todo()).max_items(100, "Too many todos in heading"),
        ),
    ])
}

/// Ordered, flat project contents: to-dos and heading dividers.
pub fn project_items() -> Schema {
    Schema::array(Schema::tagged_union(
        "type",
        [("todo", project_todo()), ("heading", project_heading())],
    ))
    .max_items(200, "Too many items")
    .describe("Ordered to-dos and headings. A heading groups the to-dos that follow it, or the to-dos in its own items list.")
}
