//! Template front matter
//!
//! A template may start with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! description: "Go style rules"
//! globs: "**/*.go"
//! tags: [backend, go]
//! custom:
//!   build_tool: "make"
//! ---
//! Template body...
//! ```
//!
//! Known keys decode into typed fields. Anything else lands in `custom`
//! with its YAML value preserved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::CompileError;

const DELIMITER: &str = "---";
const CUSTOM_KEY: &str = "custom";

/// Decoded front matter of one template
///
/// A template without front matter yields `TemplateFrontMatter::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateFrontMatter {
    pub description: String,
    /// How claude consumes the rule ("memory", "command" or "both")
    pub claude_mode: String,
    pub globs: String,
    pub project_type: String,
    pub language: String,
    pub framework: String,
    pub tags: Vec<String>,
    /// String-typed flag; a YAML bool is stored as "true"/"false"
    pub always_apply: String,
    pub documentation: String,
    pub style_guide: String,
    pub examples: String,
    /// Fields outside the fixed set
    pub custom: BTreeMap<String, Value>,
}

impl TemplateFrontMatter {
    fn from_mapping(mut map: Mapping) -> Result<Self, CompileError> {
        let mut front_matter = Self {
            description: take_string(&mut map, "description")?,
            claude_mode: take_string(&mut map, "claude_mode")?,
            globs: take_string(&mut map, "globs")?,
            project_type: take_string(&mut map, "project_type")?,
            language: take_string(&mut map, "language")?,
            framework: take_string(&mut map, "framework")?,
            tags: take_string_list(&mut map, "tags")?,
            always_apply: take_string(&mut map, "always_apply")?,
            documentation: take_string(&mut map, "documentation")?,
            style_guide: take_string(&mut map, "style_guide")?,
            examples: take_string(&mut map, "examples")?,
            custom: BTreeMap::new(),
        };

        let explicit = match map.remove(CUSTOM_KEY) {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(custom)) => custom,
            Some(other) => return Err(mismatch(CUSTOM_KEY, "a mapping", &other)),
        };

        // Leftover top-level keys first so an explicit `custom:` entry wins.
        for (key, value) in map.into_iter().chain(explicit) {
            let key = key_to_string(key)?;
            debug!(%key, "TemplateFrontMatter::from_mapping: custom field");
            front_matter.custom.insert(key, value);
        }

        Ok(front_matter)
    }
}

/// Parse the front matter of a template, discarding the body
pub fn parse_template_front_matter(content: &str) -> Result<TemplateFrontMatter, CompileError> {
    split_front_matter(content).map(|(front_matter, _)| front_matter)
}

/// Split a template into its decoded front matter and the remaining body
///
/// Content that does not open with a `---` line has no front matter: the
/// result is a default record and the whole input as body. An opening
/// delimiter without a closing one is an error.
pub fn split_front_matter(content: &str) -> Result<(TemplateFrontMatter, &str), CompileError> {
    debug!(content_len = content.len(), "split_front_matter: called");
    let Some((block, body)) = locate_block(content)? else {
        debug!("split_front_matter: no front matter block");
        return Ok((TemplateFrontMatter::default(), content));
    };

    if block.trim().is_empty() {
        debug!("split_front_matter: empty front matter block");
        return Ok((TemplateFrontMatter::default(), body));
    }

    let value: Value =
        serde_yaml::from_str(block).map_err(|e| CompileError::malformed(format!("invalid YAML: {}", e)))?;

    let front_matter = match value {
        Value::Null => TemplateFrontMatter::default(),
        Value::Mapping(map) => TemplateFrontMatter::from_mapping(map)?,
        other => {
            return Err(CompileError::malformed(format!(
                "expected a mapping, found {}",
                kind_of(&other)
            )));
        }
    };

    debug!(description = %front_matter.description, "split_front_matter: parsed");
    Ok((front_matter, body))
}

/// Find the YAML block and the body that follows it
fn locate_block(content: &str) -> Result<Option<(&str, &str)>, CompileError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            return Ok(Some((&content[start..offset], &content[offset + line.len()..])));
        }
        offset += line.len();
    }

    Err(CompileError::malformed("missing closing '---' delimiter"))
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn take_string(map: &mut Mapping, key: &str) -> Result<String, CompileError> {
    match map.remove(key) {
        None => Ok(String::new()),
        Some(value) => scalar_to_string(value).map_err(|other| mismatch(key, "a string", &other)),
    }
}

fn take_string_list(map: &mut Mapping, key: &str) -> Result<Vec<String>, CompileError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| scalar_to_string(item).map_err(|other| mismatch(key, "a list of strings", &other)))
            .collect(),
        Some(other) => Err(mismatch(key, "a list of strings", &other)),
    }
}

/// Render a scalar as text; structured values are handed back unchanged
fn scalar_to_string(value: Value) -> Result<String, Value> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Tagged(tagged) => scalar_to_string(tagged.value),
        other => Err(other),
    }
}

fn key_to_string(key: Value) -> Result<String, CompileError> {
    scalar_to_string(key).map_err(|other| {
        CompileError::malformed(format!("custom field keys must be scalars, found {}", kind_of(&other)))
    })
}

fn mismatch(key: &str, expected: &str, found: &Value) -> CompileError {
    CompileError::malformed(format!("field '{}' must be {}, found {}", key, expected, kind_of(found)))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_front_matter() {
        let content = "---\ndescription: \"Test template\"\nclaude_mode: \"memory\"\nglobs: \"**/*.go\"\n---\nTemplate content here";

        let (fm, body) = split_front_matter(content).unwrap();
        assert_eq!(fm.description, "Test template");
        assert_eq!(fm.claude_mode, "memory");
        assert_eq!(fm.globs, "**/*.go");
        assert!(fm.tags.is_empty());
        assert!(fm.custom.is_empty());
        assert_eq!(body, "Template content here");
    }

    #[test]
    fn test_extended_fields() {
        let content = r#"---
description: "Test template with extended fields"
claude_mode: "both"
globs: "**/*.{js,ts}"
project_type: "web-application"
language: "TypeScript"
framework: "React"
tags:
  - "frontend"
  - "spa"
always_apply: "true"
documentation: "docs/frontend.md"
style_guide: "Airbnb JavaScript style guide"
examples: "examples/react/"
custom:
  build_tool: "Vite"
  testing_framework: "Jest"
---
Template with extended fields"#;

        let fm = parse_template_front_matter(content).unwrap();
        assert_eq!(fm.description, "Test template with extended fields");
        assert_eq!(fm.claude_mode, "both");
        assert_eq!(fm.globs, "**/*.{js,ts}");
        assert_eq!(fm.project_type, "web-application");
        assert_eq!(fm.language, "TypeScript");
        assert_eq!(fm.framework, "React");
        assert_eq!(fm.tags, vec!["frontend".to_string(), "spa".to_string()]);
        assert_eq!(fm.always_apply, "true");
        assert_eq!(fm.documentation, "docs/frontend.md");
        assert_eq!(fm.style_guide, "Airbnb JavaScript style guide");
        assert_eq!(fm.examples, "examples/react/");
        assert_eq!(fm.custom.len(), 2);
        assert_eq!(fm.custom["build_tool"], Value::String("Vite".to_string()));
        assert_eq!(fm.custom["testing_framework"], Value::String("Jest".to_string()));
    }

    #[test]
    fn test_no_front_matter() {
        let content = "Template without front matter\nJust content here";

        let (fm, body) = split_front_matter(content).unwrap();
        assert_eq!(fm, TemplateFrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_delimiter_must_open_content() {
        let content = "Intro\n---\ndescription: nope\n---\n";

        let (fm, body) = split_front_matter(content).unwrap();
        assert!(fm.description.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_front_matter_is_error() {
        let content = "---\ndescription: \"never closed\"\nbody";

        let err = parse_template_front_matter(content).unwrap_err();
        assert!(matches!(err, CompileError::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_tags_must_be_a_sequence() {
        let content = "---\ntags: \"frontend\"\n---\n";

        let err = parse_template_front_matter(content).unwrap_err();
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn test_tags_reject_nested_structures() {
        let content = "---\ntags:\n  - [a, b]\n---\n";

        assert!(parse_template_front_matter(content).is_err());
    }

    #[test]
    fn test_unknown_keys_go_to_custom() {
        let content = "---\ndescription: d\nmax_line_length: 120\nstrict: true\n---\nbody";

        let fm = parse_template_front_matter(content).unwrap();
        assert_eq!(fm.description, "d");
        assert_eq!(fm.custom["max_line_length"].as_u64(), Some(120));
        assert_eq!(fm.custom["strict"], Value::Bool(true));
    }

    #[test]
    fn test_explicit_custom_wins_over_top_level() {
        let content = "---\nbuild_tool: make\ncustom:\n  build_tool: Vite\n---\n";

        let fm = parse_template_front_matter(content).unwrap();
        assert_eq!(fm.custom.len(), 1);
        assert_eq!(fm.custom["build_tool"], Value::String("Vite".to_string()));
    }

    #[test]
    fn test_custom_keeps_nested_values() {
        let content = "---\ncustom:\n  lint:\n    enabled: true\n    level: 2\n---\n";

        let fm = parse_template_front_matter(content).unwrap();
        let lint = fm.custom["lint"].as_mapping().unwrap();
        assert_eq!(lint.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(lint.get("level").and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn test_custom_must_be_a_mapping() {
        let content = "---\ncustom: [a, b]\n---\n";

        assert!(parse_template_front_matter(content).is_err());
    }

    #[test]
    fn test_always_apply_accepts_bool() {
        let content = "---\nalways_apply: true\n---\n";

        let fm = parse_template_front_matter(content).unwrap();
        assert_eq!(fm.always_apply, "true");
    }

    #[test]
    fn test_crlf_delimiters() {
        let content = "---\r\ndescription: windows\r\n---\r\nbody\r\n";

        let (fm, body) = split_front_matter(content).unwrap();
        assert_eq!(fm.description, "windows");
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = split_front_matter("---\n---\nbody").unwrap();
        assert_eq!(fm, TemplateFrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_non_mapping_block_is_error() {
        assert!(parse_template_front_matter("---\n- a\n- b\n---\n").is_err());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = parse_template_front_matter("---\ndescription: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, CompileError::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_byte_order_mark_before_front_matter() {
        let (fm, body) = split_front_matter("\u{feff}---\ndescription: x\n---\nbody").unwrap();
        assert_eq!(fm.description, "x");
        assert_eq!(body, "body");
    }
}
