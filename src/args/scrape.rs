//! Argument declarations scraped from handler source text.
//!
//! Every `.add_argument(` call in the source is cut out with a balanced
//! parenthesis match, parsed as call arguments and its keyword arguments are
//! evaluated as literals. A keyword whose value refers to a name that cannot
//! be resolved is dropped; the rest of the declaration is kept.

use super::literal::{eval, parse_arguments, EvalError, Literal};
use super::{location_label, type_label, ArgField, ArgRecord};
use log::{debug, warn};

/// Text that opens a declaration.
pub const DECLARATION_TOKEN: &str = ".add_argument(";

/// Removes the docstring and doc-comment lines so declarations quoted in
/// documentation are not picked up.
pub fn strip_docstring(source: &str, doc: Option<&str>) -> String {
    let source = match doc {
        Some(doc) if !doc.trim().is_empty() => source.replacen(doc, "", 1),
        _ => source.to_string(),
    };

    source
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !(line.starts_with("///") || line.starts_with("//!") || line.starts_with("#[doc"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scrapes every declaration in `source`, in source order.
pub fn scrape_declarations(source: &str, doc: Option<&str>) -> Vec<ArgRecord> {
    let code = strip_docstring(source, doc);
    let mut records = Vec::new();

    for segment in code.split(DECLARATION_TOKEN).skip(1) {
        let Some(arguments) = declaration_arguments(segment) else {
            warn!("Skipping unterminated argument declaration");
            continue;
        };
        if let Some(record) = parse_declaration(arguments) {
            records.push(record);
        }
    }

    records
}

/// Tracks whether the current character sits inside a string or char literal.
#[derive(Default)]
struct QuoteTracker {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteTracker {
    /// Feeds one character; returns true when it belongs to a literal.
    fn step(&mut self, c: char) -> bool {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.quote = None;
                }
                true
            }
            None if c == '"' || c == '\'' => {
                self.quote = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Text between the opening parenthesis (already consumed) and its match.
fn declaration_arguments(segment: &str) -> Option<&str> {
    let mut quotes = QuoteTracker::default();
    let mut depth = 1usize;

    for (idx, c) in segment.char_indices() {
        if quotes.step(c) {
            continue;
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&segment[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_declaration(arguments: &str) -> Option<ArgRecord> {
    let call = match parse_arguments(arguments) {
        Ok(call) => call,
        Err(err) => {
            warn!("Skipping argument declaration: {}", err);
            return None;
        }
    };

    let name = match call.positional.first().map(eval) {
        Some(Ok(Literal::Str(name))) if !name.is_empty() => name,
        _ => {
            warn!("Skipping argument declaration without a name");
            return None;
        }
    };

    let mut record = ArgRecord::new(name);
    for (keyword, expr) in &call.keywords {
        let value = match eval(expr) {
            Ok(value) => value,
            Err(EvalError::UndefinedName(undefined)) => {
                debug!(
                    "Argument {}: dropped keyword {} using '{}'",
                    record.name, keyword, undefined
                );
                continue;
            }
            Err(err) => {
                warn!("Skipping argument declaration {:?}: {}", record.name, err);
                return None;
            }
        };
        match ArgField::from_keyword(keyword) {
            Some(field) => record.set(field, field_value(field, &value)),
            None => debug!("Ignoring keyword {} on argument {}", keyword, record.name),
        }
    }
    record.apply_bare_defaults();
    Some(record)
}

fn field_value(field: ArgField, value: &Literal) -> String {
    match (field, value) {
        (ArgField::Location, Literal::Str(keyword)) => location_label(keyword).to_string(),
        (ArgField::Location, Literal::List(items)) => items
            .iter()
            .map(|item| location_label(&item.render()))
            .collect::<Vec<_>>()
            .join(", "),
        (ArgField::Type, Literal::Type(name) | Literal::Str(name)) => type_label(name).to_string(),
        _ => value.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TODO_POST: &str = r##"
    /// Add todo
    ///
    /// parser.add_argument("hidden", r#type = String)
    async fn post(Json(body): Json<Value>) -> Json<Value> {
        let parser = RequestParser::new();
        parser.add_argument(
            "name", location = "json", r#type = String, required = true, help = "todo name",
        );
        parser.add_argument(
            "type", location = "json", r#type = &str, required = true, default = "life",
            help = "todo type".to_string(),
        );
        parser.add_argument();
        Json(json!({"todo": "post todo"}))
    }
"##;

    #[test]
    fn test_scrape_todo_post() {
        let records = scrape_declarations(TODO_POST, Some("Add todo"));
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name, "name");
        assert_eq!(records[0].get(ArgField::Location), Some("body"));
        assert_eq!(records[0].get(ArgField::Type), Some("string"));
        assert_eq!(records[0].get(ArgField::Required), Some("true"));
        assert_eq!(records[0].get(ArgField::Help), Some("todo name"));

        assert_eq!(records[1].name, "type");
        assert_eq!(records[1].get(ArgField::Default), Some("life"));
        assert_eq!(records[1].get(ArgField::Help), Some("todo type"));
        let fields: Vec<ArgField> = records[1].fields().collect();
        assert_eq!(
            fields,
            vec![
                ArgField::Location,
                ArgField::Type,
                ArgField::Required,
                ArgField::Default,
                ArgField::Help
            ]
        );
    }

    #[test]
    fn test_scrape_drops_unresolvable_keywords() {
        let source = r#"parser.add_argument("email", r#type = validate_email, location = ("json", "args"), required = false)"#;
        let records = scrape_declarations(source, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(ArgField::Type), None);
        assert_eq!(records[0].get(ArgField::Location), Some("body, query"));
        assert_eq!(records[0].get(ArgField::Required), Some("false"));
    }

    #[test]
    fn test_scrape_bare_declaration_gets_defaults() {
        let records = scrape_declarations(r#"p.add_argument("page")"#, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(ArgField::Required), Some("false"));
        assert_eq!(records[0].get(ArgField::Nullable), Some("true"));

        // Every keyword unresolvable: the record is bare again
        let records = scrape_declarations(r#"p.add_argument("q", r#type = check)"#, None);
        assert_eq!(records[0].get(ArgField::Nullable), Some("true"));
    }

    #[test]
    fn test_scrape_parenthesis_in_strings() {
        let source = r#"p.add_argument("tag", help = "one of (a, b)", default = ")")"#;
        let records = scrape_declarations(source, None);
        assert_eq!(records[0].get(ArgField::Help), Some("one of (a, b)"));
        assert_eq!(records[0].get(ArgField::Default), Some(")"));
    }

    #[test]
    fn test_scrape_skips_broken_declarations() {
        let source = "p.add_argument(\"a\", help = @bad)\np.add_argument(\"b\", required = true)\np.add_argument(\"c\"";
        let records = scrape_declarations(source, None);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_scrape_rust_spelling() {
        let source = r#"parser.add_argument("limit", r#type = u32, default = 20u32, help = "page size".to_string())"#;
        let records = scrape_declarations(source, None);
        assert_eq!(records[0].get(ArgField::Type), Some("integer"));
        assert_eq!(records[0].get(ArgField::Default), Some("20"));
        assert_eq!(records[0].get(ArgField::Help), Some("page size"));
    }

    #[test]
    fn test_strip_docstring_drops_doc_comments() {
        let source = "/// parser.add_argument(\"doc\")\n#[doc = \"x\"]\nfn f() {}\n";
        assert_eq!(strip_docstring(source, None), "fn f() {}");
    }
}
