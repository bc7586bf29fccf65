// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template: a single renderable unit over a task's dependencies.

use std::collections::HashMap;

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

use crate::dependency::{Dependency, DependencyValue};

/// Regex pattern for ${variable_name} or ${namespace.variable_name}
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

// Regex pattern for ${VAR:-default} environment variable expansion
#[allow(clippy::expect_used)]
static ENV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+):-([^}]*)\}").expect("constant regex pattern is valid"));

/// Escape a string for safe use inside shell single-quoted contexts.
///
/// Single quotes in the value are replaced with `'\''` (end quote, escaped
/// literal quote, start quote), which is the standard bash idiom for
/// embedding a single quote inside a single-quoted string.
pub fn escape_for_shell(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Interpolate `${name}` placeholders with values from the vars map.
///
/// Also expands `${VAR:-default}` patterns from environment variables.
/// Environment variables are expanded first, then template variables.
/// Unknown template variables are left as-is.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    interpolate_inner(template, vars, false)
}

/// Like [`interpolate`], but escapes substituted values for safe use in
/// shell contexts (single quotes are escaped using the `'\''` idiom).
pub fn interpolate_shell(template: &str, vars: &HashMap<String, String>) -> String {
    interpolate_inner(template, vars, true)
}

fn interpolate_inner(template: &str, vars: &HashMap<String, String>, shell_escape: bool) -> String {
    let result = ENV_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = &caps[2];
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .to_string();

    VAR_PATTERN
        .replace_all(&result, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) if shell_escape => escape_for_shell(val),
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Stable identifier for a [`Template`], derived from the hash of its
/// declaration (task name + ordered dependency list). Two templates with the
/// same dependencies hash to the same ID; `DriverRegistry` uses this to
/// reject colliding inserts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    fn from_declaration(task_name: &str, dependencies: &[Dependency]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(task_name.as_bytes());
        for dep in dependencies {
            hasher.update(format!("{dep:?}").as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single renderable unit: an expression over a task's dependencies that
/// produces the executor's variables file.
#[derive(Debug, Clone)]
pub struct Template {
    id: TemplateId,
    dependencies: Vec<Dependency>,
    /// sha256 of the last successfully rendered artifact, to detect `changed`.
    last_rendered_hash: Option<String>,
}

impl Template {
    pub fn new(task_name: &str, dependencies: Vec<Dependency>) -> Self {
        let id = TemplateId::from_declaration(task_name, &dependencies);
        Self { id, dependencies, last_rendered_hash: None }
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Render `tmpl_source` (the on-disk `terraform.tfvars.tmpl` template
    /// source, `${dep_i}` directives in declaration order) against the
    /// current value of every dependency, in the same order as
    /// [`Template::dependencies`]. Returns `None` when any dependency has no
    /// value yet (not ready). Returns `Some((bytes, changed))` once all
    /// dependencies are satisfied; `changed` is true iff the rendered bytes
    /// differ from the last successful render.
    pub fn render(&mut self, tmpl_source: &str, values: &[Option<DependencyValue>]) -> Option<(Vec<u8>, bool)> {
        if values.len() != self.dependencies.len() {
            return None;
        }
        let mut resolved = Vec::with_capacity(values.len());
        for v in values {
            resolved.push(v.clone()?);
        }

        let mut vars: HashMap<String, String> = HashMap::new();
        for (i, value) in resolved.iter().enumerate() {
            vars.insert(format!("dep_{i}"), hcl_list(&value.entries));
        }
        let rendered = interpolate(tmpl_source, &vars).into_bytes();

        let mut hasher = Sha256::new();
        hasher.update(&rendered);
        let hash = format!("{:x}", hasher.finalize());
        let changed = self.last_rendered_hash.as_deref() != Some(hash.as_str());
        self.last_rendered_hash = Some(hash);
        Some((rendered, changed))
    }
}

/// Render a dependency's entries as an HCL/JSON-compatible list literal,
/// e.g. `["10.0.0.1", "10.0.0.2"]`.
fn hcl_list(entries: &[String]) -> String {
    let quoted: Vec<String> = entries.iter().map(|e| format!("{e:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod interpolate_tests;

#[cfg(test)]
#[path = "template_render_tests.rs"]
mod render_tests;
