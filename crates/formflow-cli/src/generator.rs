//! Flow file scaffolding
//!
//! Renders a starter `<name>.flow.yaml` from a text template. The template
//! uses `{name}`, `{description}` and `{steps}` placeholders.

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FLOW_TEMPLATE: &str = include_str!("../templates/flow.yaml.tmpl");

lazy_static! {
    // snake_case flow and step names
    static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// Extension appended to generated flow files
pub const GENERATED_EXTENSION: &str = "flow.yaml";

/// Inputs for a generated flow file
#[derive(Debug, Clone)]
pub struct FlowScaffold {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<String>,
}

impl FlowScaffold {
    pub fn new(name: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name and steps must be snake_case identifiers, steps must be unique
    pub fn validate(&self) -> Result<()> {
        if !IDENTIFIER_REGEX.is_match(&self.name) {
            bail!("Flow name '{}' must be a snake_case identifier", self.name);
        }
        if self.steps.is_empty() {
            bail!("Flow '{}' needs at least one step", self.name);
        }

        let mut seen = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if !IDENTIFIER_REGEX.is_match(step) {
                bail!("Step '{}' must be a snake_case identifier", step);
            }
            if seen.contains(&step) {
                bail!("Step '{}' is listed more than once", step);
            }
            seen.push(step);
        }
        Ok(())
    }

    /// Render the template, then check the result loads as a flow document
    pub fn render(&self) -> Result<String> {
        self.validate()?;

        let description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("{} flow", humanize(&self.name)));

        let steps = self
            .steps
            .iter()
            .map(|step| format!("      - id: {}\n        title: \"{}\"", step, humanize(step)))
            .collect::<Vec<_>>()
            .join("\n");

        let rendered = FLOW_TEMPLATE
            .replace("{name}", &self.name)
            .replace("{steps}", &steps)
            .replace("{description}", &escape_quoted(&description));

        formflow_dsl::parse_and_validate(&rendered)
            .with_context(|| format!("Generated flow '{}' does not validate", self.name))?;

        Ok(rendered)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, GENERATED_EXTENSION)
    }

    /// Write the rendered file into `output_dir`, refusing to overwrite unless `force`
    pub fn write_to(&self, output_dir: &Path, force: bool) -> Result<PathBuf> {
        let rendered = self.render()?;
        let path = output_dir.join(self.file_name());

        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        fs::write(&path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;

        info!(flow_id = %self.name, path = %path.display(), "Flow file generated");
        Ok(path)
    }
}

/// `contact_details` -> `Contact details`
fn humanize(identifier: &str) -> String {
    let spaced = identifier.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape for a double-quoted YAML scalar
fn escape_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}
