#![deny(missing_docs)]

//! # Rule Registry
//!
//! Maps CRD names (e.g. `acls.messaging.example.com`) to the CEL rules that
//! must be injected into their schema, and to the schema section receiving them.
//!
//! A registry is a plain value: it is built once (compiled-in via [`Registry::builtin`]
//! or loaded from YAML) and handed to the [`Patcher`](crate::Patcher), which never mutates it.
//! Entry order is preserved, so matching follows registration order.

use crate::error::{AppError, AppResult};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Resource name of the ACL CRD shipped with the messaging operator.
pub const ACL_CRD_NAME: &str = "acls.messaging.example.com";

/// A single CEL assertion and the message reported when it fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// CEL expression evaluated against the resource at admission time.
    #[serde(rename = "rule", alias = "expression")]
    pub expression: String,
    /// Human readable failure text.
    pub message: String,
}

impl ValidationRule {
    /// Creates a new rule.
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// Schema section that receives the rendered rules.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPath {
    /// The `spec` property of the version schema.
    #[default]
    #[display("spec")]
    Spec,
}

/// Rules registered for one resource, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSpec {
    /// Where the block is inserted.
    #[serde(rename = "path", default)]
    pub target_path: TargetPath,
    /// Rules, rendered in this order.
    #[serde(rename = "validations")]
    pub rules: Vec<ValidationRule>,
}

impl ValidationSpec {
    /// Creates a spec targeting `target_path`.
    pub fn new(target_path: TargetPath, rules: Vec<ValidationRule>) -> Self {
        Self { target_path, rules }
    }
}

/// Ordered mapping from resource identifier to its [`ValidationSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: IndexMap<String, ValidationSpec>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule table compiled into the tool.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(
            ACL_CRD_NAME,
            ValidationSpec::new(
                TargetPath::Spec,
                vec![ValidationRule::new(
                    "(has(self.topicRef) && !has(self.consumerGroupRef)) || (!has(self.topicRef) && has(self.consumerGroupRef))",
                    "Exactly one of topicRef or consumerGroupRef must be specified",
                )],
            ),
        );
        registry
    }

    /// Parses and validates a registry from YAML text.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        let registry: Registry = serde_yaml::from_str(yaml)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Reads a registry file from disk.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Registers `spec` under `name`, returning any spec it replaced.
    ///
    /// Replacing keeps the original position of the entry.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        spec: ValidationSpec,
    ) -> Option<ValidationSpec> {
        self.entries.insert(name.into(), spec)
    }

    /// Looks up the spec registered for `name`.
    pub fn get(&self, name: &str) -> Option<&ValidationSpec> {
        self.entries.get(name)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejects tables the renderer cannot turn into a valid block.
    pub fn validate(&self) -> AppResult<()> {
        for (name, spec) in &self.entries {
            if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
                return Err(AppError::Config(format!(
                    "invalid resource identifier '{}'",
                    name
                )));
            }
            if spec.rules.is_empty() {
                return Err(AppError::Config(format!(
                    "resource '{}' has no validations",
                    name
                )));
            }
            for (idx, rule) in spec.rules.iter().enumerate() {
                if rule.expression.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "resource '{}' validation #{} has an empty rule",
                        name, idx
                    )));
                }
                if rule.message.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "resource '{}' validation #{} has an empty message",
                        name, idx
                    )));
                }
            }
        }
        Ok(())
    }
}
