//! Structured payloads for the Things JSON command.
//!
//! Project contents are a single ordered sequence of siblings. A heading is a
//! divider: the to-dos that follow it are grouped visually in Things but stay
//! siblings in the sequence, never children of the heading. To-dos supplied
//! under a heading's `items` are flattened into the sequence right after it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// One record of the JSON command's `data` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: Map<String, Value>,
}

impl JsonItem {
    fn create(kind: &str, attributes: Map<String, Value>) -> Self {
        Self {
            kind: kind.to_string(),
            operation: None,
            id: None,
            attributes,
        }
    }

    fn to_value(&self) -> Value {
        let mut value = json!({ "type": self.kind, "attributes": self.attributes });
        if let (Some(operation), Value::Object(m)) = (&self.operation, &mut value) {
            m.insert("operation".into(), json!(operation));
        }
        value
    }
}

/// Attribute map that skips absent and empty values.
#[derive(Default)]
struct Attributes(Map<String, Value>);

impl Attributes {
    fn text(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.0.insert(key.into(), json!(v));
        }
        self
    }

    fn flag(mut self, key: &str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.into(), json!(v));
        }
        self
    }

    fn list(mut self, key: &str, values: Vec<Value>) -> Self {
        if !values.is_empty() {
            self.0.insert(key.into(), Value::Array(values));
        }
        self
    }

    fn tags(self, tags: &[String]) -> Self {
        self.list("tags", tags.iter().map(|t| json!(t)).collect())
    }
}

fn checklist_item(title: &str, completed: Option<bool>) -> Value {
    let attributes = Attributes::default()
        .text("title", Some(title))
        .flag("completed", completed);
    JsonItem::create("checklist-item", attributes.0).to_value()
}

/// A to-do created on its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub checklist_items: Vec<String>,
    pub list_id: Option<String>,
    pub list: Option<String>,
    pub heading: Option<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
}

impl TodoDraft {
    pub fn to_item(&self) -> JsonItem {
        let checklist = self
            .checklist_items
            .iter()
            .map(|title| checklist_item(title, None))
            .collect();
        let attributes = Attributes::default()
            .text("title", Some(&self.title))
            .text("notes", self.notes.as_deref())
            .text("when", self.when.as_deref())
            .text("deadline", self.deadline.as_deref())
            .tags(&self.tags)
            .list("checklist-items", checklist)
            .text("list-id", self.list_id.as_deref())
            .text("list", self.list.as_deref())
            .text("heading", self.heading.as_deref())
            .flag("completed", self.completed)
            .flag("canceled", self.canceled);
        JsonItem::create("to-do", attributes.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistEntry {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A to-do inside a project's item sequence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectTodo {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    #[serde(default)]
    pub checklist: Vec<ChecklistEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadingDraft {
    pub title: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub items: Vec<ProjectTodo>,
}

/// A member of a project's ordered item sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProjectItem {
    Todo(ProjectTodo),
    Heading(HeadingDraft),
}

fn heading_value(heading: &HeadingDraft) -> Value {
    let mut attributes = Map::new();
    attributes.insert("title".into(), json!(heading.title));
    attributes.insert("archived".into(), json!(heading.archived));
    JsonItem::create("heading", attributes).to_value()
}

fn todo_value(todo: &ProjectTodo) -> Value {
    let checklist = todo
        .checklist
        .iter()
        .map(|c| checklist_item(&c.title, Some(c.completed)))
        .collect();
    let attributes = Attributes::default()
        .text("title", Some(&todo.title))
        .text("notes", todo.notes.as_deref())
        .text("when", todo.when.as_deref())
        .text("deadline", todo.deadline.as_deref())
        .tags(&todo.tags)
        .flag("completed", todo.completed)
        .flag("canceled", todo.canceled)
        .list("checklist-items", checklist);
    JsonItem::create("to-do", attributes.0).to_value()
}

/// Marshal a project item sequence, preserving order exactly.
pub fn project_items(items: &[ProjectItem]) -> Vec<Value> {
    let mut values = Vec::with_capacity(item_count(items));
    for item in items {
        match item {
            ProjectItem::Todo(todo) => values.push(todo_value(todo)),
            ProjectItem::Heading(heading) => {
                values.push(heading_value(heading));
                values.extend(heading.items.iter().map(todo_value));
            }
        }
    }
    values
}

/// Number of records `project_items` produces for `items`.
pub fn item_count(items: &[ProjectItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            ProjectItem::Todo(_) => 1,
            ProjectItem::Heading(heading) => 1 + heading.items.len(),
        })
        .sum()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub area_id: Option<String>,
    pub area: Option<String>,
    #[serde(default)]
    pub items: Vec<ProjectItem>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
}

impl ProjectDraft {
    /// The project as a single record with its contents under `items`.
    pub fn to_item(&self) -> JsonItem {
        let attributes = Attributes::default()
            .text("title", Some(&self.title))
            .text("notes", self.notes.as_deref())
            .text("when", self.when.as_deref())
            .text("deadline", self.deadline.as_deref())
            .tags(&self.tags)
            .text("area-id", self.area_id.as_deref())
            .text("area", self.area.as_deref())
            .flag("completed", self.completed)
            .flag("canceled", self.canceled)
            .list("items", project_items(&self.items));
        JsonItem::create("project", attributes.0)
    }
}

/// An update record appending `items` to the existing project `project_id`.
pub fn append_to_project(project_id: &str, items: &[ProjectItem]) -> JsonItem {
    let mut attributes = Map::new();
    attributes.insert("items".into(), Value::Array(project_items(items)));
    JsonItem {
        kind: "project".into(),
        operation: Some("update".into()),
        id: Some(project_id.to_string()),
        attributes,
    }
}
