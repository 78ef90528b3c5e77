//! INI reading and writing.
//!
//! Section names and keys are `/`-separated paths: `[a/b]` followed by
//! `c = 1` stores `a/b/c`. Keys before the first section are top-level.
//! `;` and `#` start comment lines.

use std::collections::BTreeMap;

use configuration_core::{join_path, split_path, Error, Node, Tree, Visitor, DEFAULT_SEPARATOR};

/// Parse INI text into a `/`-separated tree.
pub(crate) fn parse(text: &str, source_name: &str) -> Result<Tree, Error> {
    let mut tree = Tree::new();
    let mut section: Vec<String> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        let parse_error = |message: String| Error::Parse {
            source_name: source_name.to_owned(),
            line: Some(line_number),
            message,
        };

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| parse_error("unterminated section header".to_string()))?;
            section = split_path(name.trim(), DEFAULT_SEPARATOR);
            if section.is_empty() {
                return Err(parse_error("empty section name".to_string()));
            }
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| parse_error(format!("expected 'key = value', found '{}'", line)))?;
        let key = split_path(key.trim(), DEFAULT_SEPARATOR);
        if key.is_empty() {
            return Err(parse_error("empty key".to_string()));
        }

        let mut segments = section.clone();
        segments.extend(key);
        tree.insert_segments(&segments, value.trim())
            .map_err(|e| parse_error(e.to_string()))?;
    }

    Ok(tree)
}

/// Check that a path segment can be written back as an INI section or key.
///
/// `/` is rejected since it separates nested sections on disk.
pub(crate) fn check_segment(segment: &str) -> Result<(), Error> {
    let forbidden = |c: char| matches!(c, '=' | '[' | ']' | '/' | '\n' | '\r');
    if segment.contains(forbidden)
        || segment.starts_with(';')
        || segment.starts_with('#')
        || segment.trim() != segment
    {
        return Err(Error::InvalidPath {
            message: format!("'{}' cannot be stored as an INI key", segment),
        });
    }
    Ok(())
}

pub(crate) fn check_value(value: &str) -> Result<(), Error> {
    if value.contains(['\n', '\r']) || value.trim() != value {
        return Err(Error::InvalidPath {
            message: "INI values cannot span lines or carry surrounding whitespace".to_string(),
        });
    }
    Ok(())
}

/// Emits each branch that has leaf children as one section.
struct Writer {
    out: String,
}

impl Visitor for Writer {
    fn visit_branch(&mut self, path: &[&str], children: &BTreeMap<String, Node>) {
        let mut leaves = children
            .iter()
            .filter_map(|(name, child)| child.value().map(|value| (name, value)))
            .peekable();
        if leaves.peek().is_none() {
            return;
        }
        if !path.is_empty() {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.out
                .push_str(&format!("[{}]\n", join_path(path, DEFAULT_SEPARATOR)));
        }
        for (name, value) in leaves {
            self.out.push_str(&format!("{} = {}\n", name, value));
        }
    }

    fn visit_leaf(&mut self, _path: &[&str], _value: &str) {}
}

/// Render a tree as INI text. Top-level values come first.
pub(crate) fn render(tree: &Tree) -> String {
    let mut writer = Writer { out: String::new() };
    tree.walk(&mut writer);
    writer.out
}
