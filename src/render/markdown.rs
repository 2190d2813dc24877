//! Markdown export.
//!
//! Layout: the title as level one heading, groups at level two, entries at
//! level three. Headings inside an entry's markdown block are pushed below
//! level three so the outline stays intact.

use crate::aggregator::{Aggregate, ApiEntry, RouteEntry};
use crate::classifier::ApiType;
use crate::config::DocConfig;

/// Level of entry headings; block headings are demoted below it.
const ENTRY_LEVEL: usize = 3;

pub struct MarkdownBuilder<'c> {
    config: &'c DocConfig,
}

impl<'c> MarkdownBuilder<'c> {
    pub fn new(config: &'c DocConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, aggregate: &Aggregate) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}\n\n", self.config.title));
        out.push_str(&format!("> version: {}\n\n", self.config.version));
        if !self.config.description.trim().is_empty() {
            out.push_str(self.config.description.trim());
            out.push_str("\n\n");
        }

        for group in aggregate.groups() {
            write_group(&mut out, group);
        }

        format!("{}\n", out.trim_end())
    }
}

fn write_group(out: &mut String, group: &RouteEntry) {
    if group.name_extra.is_empty() {
        out.push_str(&format!("## {}\n\n", group.logical_name));
    } else {
        out.push_str(&format!("## {}({})\n\n", group.logical_name, group.name_extra));
    }

    for entry in &group.children {
        write_entry(out, entry);
    }
}

fn write_entry(out: &mut String, entry: &ApiEntry) {
    out.push_str(&format!("### {}\n\n", entry.name));

    out.push_str("**URL**\n\n");
    for url in entry.url.split_whitespace() {
        out.push_str(&format!("- `{}`\n", url));
    }
    out.push('\n');

    if entry.api_type == ApiType::Api {
        out.push_str("**Method**\n\n");
        for method in entry.method.as_deref().unwrap_or_default().split_whitespace() {
            out.push_str(&format!("- `{}`\n", method));
        }
        out.push('\n');
    }

    let fence = fence_for(&entry.doc);
    out.push_str(&format!("{}doc\n{}\n{}\n\n", fence, entry.doc, fence));

    if !entry.doc_md.trim().is_empty() {
        out.push_str(&demote_headings(&entry.doc_md, ENTRY_LEVEL));
        out.push_str("\n\n");
    }
}

/// A backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Shifts every ATX heading of `markdown` down by `levels`, capped at six.
/// Lines inside fenced code blocks are left alone, and a fence still open at
/// the end is closed so it cannot swallow the rest of the document.
pub fn demote_headings(markdown: &str, levels: usize) -> String {
    let mut fence: Option<(char, usize)> = None;
    let mut lines = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if let Some(marker) = fence_marker(trimmed) {
            match fence {
                None => fence = Some(marker),
                Some((c, len)) if marker.0 == c && marker.1 >= len => fence = None,
                Some(_) => {}
            }
            lines.push(line.to_string());
            continue;
        }

        match (fence, heading_level(trimmed)) {
            (None, Some(level)) => {
                let new_level = (level + levels).min(6);
                lines.push(format!("{}{}", "#".repeat(new_level), &trimmed[level..]));
            }
            _ => lines.push(line.to_string()),
        }
    }

    if let Some((c, len)) = fence {
        lines.push(c.to_string().repeat(len));
    }
    lines.join("\n")
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let first = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == first).count();
    (len >= 3).then_some((first, len))
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|c| *c == '#').count();
    let rest = &line[level..];
    ((1..=6).contains(&level) && (rest.is_empty() || rest.starts_with(' '))).then_some(level)
}

/// Headings recovered from an exported document, for round-trip checks.
#[cfg(test)]
pub(crate) mod outline {
    use super::{fence_marker, heading_level};

    #[derive(Debug, Default, PartialEq, Eq)]
    pub struct OutlineEntry {
        pub name: String,
        pub urls: Vec<String>,
        pub methods: Vec<String>,
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    pub struct OutlineGroup {
        pub heading: String,
        pub entries: Vec<OutlineEntry>,
    }

    pub fn read(markdown: &str) -> Vec<OutlineGroup> {
        let mut groups: Vec<OutlineGroup> = Vec::new();
        let mut fence: Option<(char, usize)> = None;
        let mut list: Option<&str> = None;

        for line in markdown.lines() {
            if let Some(marker) = fence_marker(line) {
                fence = match fence {
                    None => Some(marker),
                    Some((c, len)) if marker.0 == c && marker.1 >= len => None,
                    other => other,
                };
                continue;
            }
            if fence.is_some() {
                continue;
            }

            match heading_level(line) {
                Some(2) => groups.push(OutlineGroup {
                    heading: line[3..].to_string(),
                    ..OutlineGroup::default()
                }),
                Some(3) => {
                    if let Some(group) = groups.last_mut() {
                        group.entries.push(OutlineEntry {
                            name: line[4..].to_string(),
                            ..OutlineEntry::default()
                        });
                    }
                }
                _ => {}
            }

            if line == "**URL**" {
                list = Some("url");
            } else if line == "**Method**" {
                list = Some("method");
            } else if let Some(item) = line.strip_prefix("- `").and_then(|l| l.strip_suffix('`')) {
                let entry = groups.last_mut().and_then(|g| g.entries.last_mut());
                match (entry, list) {
                    (Some(entry), Some("url")) => entry.urls.push(item.to_string()),
                    (Some(entry), Some("method")) => entry.methods.push(item.to_string()),
                    _ => {}
                }
            } else if !line.is_empty() {
                list = None;
            }
        }

        groups
    }
}
