//! Request argument documentation.
//!
//! Arguments reach the documentation in two ways:
//!
//! 1. **Structured**: a [`RequestParser`] built with [`Argument`] values and
//!    attached to a handler at registration time. This is the preferred way.
//! 2. **Scraped** (legacy): `.add_argument(...)` calls found in the handler's
//!    source text, see [`scrape`].
//!
//! Both produce [`ArgRecord`] values, structured ones first, which
//! [`render_table`] turns into a markdown table.

pub mod literal;
pub mod scrape;

use crate::registry::Handler;
use log::debug;

/// A documented property of a request argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgField {
    Location,
    Type,
    Required,
    Nullable,
    Default,
    Help,
}

impl ArgField {
    /// Column header used in the rendered table
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgField::Location => "location",
            ArgField::Type => "type",
            ArgField::Required => "required",
            ArgField::Nullable => "nullable",
            ArgField::Default => "default",
            ArgField::Help => "help",
        }
    }

    /// Maps a declaration keyword to a field. `type` is a Rust keyword, so
    /// `r#type`, `ty` and `kind` are accepted as spellings too.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "location" => Some(ArgField::Location),
            "type" | "ty" | "kind" => Some(ArgField::Type),
            "required" => Some(ArgField::Required),
            "nullable" => Some(ArgField::Nullable),
            "default" => Some(ArgField::Default),
            "help" => Some(ArgField::Help),
            _ => None,
        }
    }
}

/// One documented request argument.
///
/// Fields keep the order in which they were declared; the table columns
/// follow the first-seen order across all records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgRecord {
    pub name: String,
    fields: Vec<(ArgField, String)>,
}

impl ArgRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Sets a field, keeping its original position when it already exists.
    pub fn set(&mut self, field: ArgField, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: ArgField) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = ArgField> + '_ {
        self.fields.iter().map(|(f, _)| *f)
    }

    /// A declaration that names nothing but the argument is optional and
    /// nullable.
    pub(crate) fn apply_bare_defaults(&mut self) {
        if self.fields.is_empty() {
            self.set(ArgField::Required, "false");
            self.set(ArgField::Nullable, "true");
        }
    }
}

/// Where a request argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Args,
    Json,
    Form,
    Headers,
    Cookies,
    Files,
    Values,
}

impl Location {
    fn keyword(&self) -> &'static str {
        match self {
            Location::Args => "args",
            Location::Json => "json",
            Location::Form => "form",
            Location::Headers => "headers",
            Location::Cookies => "cookies",
            Location::Files => "files",
            Location::Values => "values",
        }
    }
}

/// Schema-level type of a request argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Integer,
    String,
    Boolean,
    Number,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Integer => "integer",
            ArgType::String => "string",
            ArgType::Boolean => "boolean",
            ArgType::Number => "number",
        }
    }
}

/// Display label for a location keyword; unknown keywords map to `""`.
pub fn location_label(keyword: &str) -> &'static str {
    match keyword.trim().to_ascii_lowercase().as_str() {
        "args" | "query" | "values" => "query",
        "json" | "body" => "body",
        "form" => "form",
        "headers" | "header" => "header",
        "cookies" | "cookie" => "cookie",
        "files" | "file" => "file",
        _ => "",
    }
}

/// Schema type name for a primitive type identifier; unknown identifiers map
/// to `""`.
pub fn type_label(identifier: &str) -> &'static str {
    let identifier = identifier.trim().trim_start_matches('&');
    let last = identifier.rsplit("::").next().unwrap_or(identifier);
    match last {
        "int" | "integer" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16"
        | "u32" | "u64" | "u128" | "usize" => "integer",
        "str" | "string" | "String" => "string",
        "bool" | "boolean" => "boolean",
        "float" | "number" | "f32" | "f64" => "number",
        _ => "",
    }
}

/// Builder for one structured argument declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    record: ArgRecord,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: ArgRecord::new(name),
        }
    }

    pub fn location(mut self, location: Location) -> Self {
        self.record
            .set(ArgField::Location, location_label(location.keyword()));
        self
    }

    pub fn kind(mut self, kind: ArgType) -> Self {
        self.record.set(ArgField::Type, kind.as_str());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.record.set(ArgField::Required, required.to_string());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.record.set(ArgField::Nullable, nullable.to_string());
        self
    }

    pub fn default_value(mut self, value: impl ToString) -> Self {
        self.record.set(ArgField::Default, value.to_string());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.record.set(ArgField::Help, help);
        self
    }
}

/// Structured argument declarations attached to a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParser {
    arguments: Vec<Argument>,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn records(&self) -> Vec<ArgRecord> {
        self.arguments
            .iter()
            .map(|argument| {
                let mut record = argument.record.clone();
                record.apply_bare_defaults();
                record
            })
            .collect()
    }
}

/// Collects every argument documented for `handler`: structured
/// declarations first, then declarations scraped from its source text.
pub fn extract_args(handler: &Handler) -> Vec<ArgRecord> {
    let mut records = handler
        .parser
        .as_ref()
        .map(RequestParser::records)
        .unwrap_or_default();

    if let Some(source) = &handler.source {
        let scraped = scrape::scrape_declarations(source, handler.doc.as_deref());
        debug!(
            "Handler {}: {} structured and {} scraped arguments",
            handler.name,
            records.len(),
            scraped.len()
        );
        records.extend(scraped);
    }

    records
}

/// Renders records as a markdown table, or `None` when there are none.
pub fn render_table(records: &[ArgRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let mut columns: Vec<ArgField> = Vec::new();
    for field in records.iter().flat_map(|r| r.fields()) {
        if !columns.contains(&field) {
            columns.push(field);
        }
    }

    let mut header = vec!["name"];
    header.extend(columns.iter().map(ArgField::as_str));

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(table_row(header.iter().map(|h| h.to_string())));
    lines.push(table_row(header.iter().map(|_| "---".to_string())));
    for record in records {
        let cells = std::iter::once(escape_cell(&record.name)).chain(
            columns
                .iter()
                .map(|field| escape_cell(record.get(*field).unwrap_or_default())),
        );
        lines.push(table_row(cells));
    }

    Some(lines.join("\n"))
}

fn table_row(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}
