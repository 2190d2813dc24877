//! Docstring grammar.
//!
//! A handler docstring is split by the `@@@` delimiter into three parts:
//!
//! ```text
//! Summary line            <- title of the entry
//!
//! Free prose body         <- shown as plain text
//!
//! @@@
//! ### markdown block      <- rendered verbatim by the viewer
//! @@@
//! anything after the closing delimiter is ignored
//! ```
//!
//! The markdown block loses the indentation measured on the line right
//! before the opening delimiter, so docstrings written inside indented
//! source keep rendering correctly.

use crate::config::DocConfig;
use log::warn;

/// Marks the start and the end of the markdown block.
pub const DELIMITER: &str = "@@@";

/// The three parts of a docstring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocParts {
    /// First non-blank line of the prose section, trimmed
    pub summary: String,
    /// Prose section without the summary line, or the sentinel
    pub body: String,
    /// Whole prose section including the summary line, or the sentinel
    pub prose: String,
    /// Markdown block with its indentation removed, or empty
    pub markdown: String,
}

/// Splits raw docstrings according to the active configuration.
#[derive(Debug, Clone)]
pub struct DocstringSplitter {
    no_doc_text: String,
    all_md: bool,
}

impl DocstringSplitter {
    pub fn new(config: &DocConfig) -> Self {
        Self {
            no_doc_text: config.no_doc_text.clone(),
            all_md: config.all_md,
        }
    }

    /// Splits `raw` into summary, body and markdown block. Never fails.
    pub fn split(&self, raw: &str) -> DocParts {
        let raw = raw.replace('\t', "    ");
        let sections: Vec<&str> = raw.split(DELIMITER).collect();
        if sections.len() > 3 {
            warn!(
                "Docstring contains {} delimiters, ignoring text after the second one",
                sections.len() - 1
            );
        }

        let prose_section = sections[0];
        let summary = prose_section
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();

        let body_text = remove_summary(prose_section, &summary);
        let prose_text = dedent(prose_section).trim().to_string();

        let (body_text, prose_text, markdown) = match sections.get(1) {
            Some(block) => {
                let indent = trailing_indent(prose_section);
                (body_text, prose_text, strip_indent(block, indent))
            }
            // Read as if the body were wrapped in delimiters
            None if self.all_md && !body_text.is_empty() => {
                (String::new(), summary.clone(), body_text)
            }
            None => (body_text, prose_text, String::new()),
        };

        DocParts {
            summary,
            body: self.or_sentinel(body_text),
            prose: self.or_sentinel(prose_text),
            markdown,
        }
    }

    fn or_sentinel(&self, text: String) -> String {
        if text.is_empty() {
            self.no_doc_text.clone()
        } else {
            text
        }
    }
}

/// Replaces every occurrence of each key with its value.
///
/// Used to share boilerplate (example payloads, argument tables) between
/// docstrings: the docstring carries a placeholder, the registration supplies
/// the text.
pub fn apply_replacements(doc: &str, replacements: &[(String, String)]) -> String {
    replacements
        .iter()
        .fold(doc.to_string(), |doc, (key, value)| doc.replace(key, value))
}

/// Turns `do_work` into `Do Work`.
pub fn humanize(function_name: &str) -> String {
    function_name
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Removes the common leading indentation of all non-blank lines.
pub fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops the summary line once and tidies the remaining prose.
fn remove_summary(prose_section: &str, summary: &str) -> String {
    let mut removed = false;
    let remaining: Vec<&str> = prose_section
        .lines()
        .filter(|line| {
            if !removed && !summary.is_empty() && line.trim() == summary {
                removed = true;
                return false;
            }
            true
        })
        .collect();

    dedent(&remaining.join("\n")).trim().to_string()
}

/// Number of spaces on the last line of `prose_section`, i.e. the
/// indentation of the opening delimiter.
fn trailing_indent(prose_section: &str) -> usize {
    let last_line = prose_section.rsplit('\n').next().unwrap_or_default();
    last_line.chars().filter(|c| *c == ' ').count()
}

fn strip_indent(block: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let stripped: Vec<&str> = block
        .split('\n')
        .map(|line| line.strip_prefix(pad.as_str()).unwrap_or(line))
        .collect();

    stripped
        .join("\n")
        .trim_matches(|c| c == '\n' || c == '\r')
        .trim_end()
        .to_string()
}
