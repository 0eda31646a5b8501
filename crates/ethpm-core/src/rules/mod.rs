//! Declarative rule sets.
//!
//! A rule set is compiled once from a JSON schema document into a tree of
//! [`Rule`] nodes and then interpreted by [`crate::pipeline::validate`]. Field
//! types, required-ness and grammars live in data, not in per-field code.
//!
//! A compiled [`RuleSet`] is immutable and `Send + Sync`; the embedded EthPM
//! v3 rule set is compiled on first use and shared for the whole process.

pub mod compile;
pub mod grammar;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::errors::{ConformError, ConformResult};
pub use grammar::Grammar;

/// The EthPM v3 manifest rule set, embedded at build time.
pub const ETHPM_V3_SCHEMA: &str = include_str!("../../schemas/ethpm-v3.spec.json");

/// One node of the rule tree.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Accepts any value.
    Any,
    Null,
    Boolean,
    Number(NumberRule),
    String(StringRule),
    Array(ArrayRule),
    Object(ObjectRule),
    /// Value must equal one of the listed JSON values.
    Enum(Vec<Value>),
    AnyOf(Vec<Rule>),
    OneOf(Vec<Rule>),
    AllOf(Vec<Rule>),
    /// Reference to a named definition of the owning [`RuleSet`].
    Ref(String),
    /// Applies the inner rule to values of one kind; other values pass.
    IfKind(JsonKind, Box<Rule>),
}

/// JSON value kinds that own type-specific keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
}

impl JsonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NumberRule {
    pub integer: bool,
    pub minimum: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct StringRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub format: Option<Grammar>,
    /// Closed set of accepted values (`enum` / `const` on a string).
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayRule {
    pub items: Option<Box<Rule>>,
    pub min_items: Option<usize>,
}

/// What to do with keys that are not declared under `properties`.
#[derive(Debug, Clone, Default)]
pub enum Additional {
    #[default]
    Allow,
    Deny,
    Rule(Box<Rule>),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRule {
    /// Declared properties, in rule-set declaration order.
    pub properties: Vec<(String, Rule)>,
    pub required: Vec<String>,
    pub dependencies: Vec<Dependency>,
    /// Applied to every key.
    pub property_names: Option<Box<Rule>>,
    /// Applied to every undeclared value.
    pub additional: Additional,
}

impl ObjectRule {
    pub fn property(&self, name: &str) -> Option<&Rule> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, r)| r)
    }
}

/// Conditional required-ness between sibling fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// `field` present implies every entry of `requires` present.
    Requires { field: String, requires: Vec<String> },
    /// Both present or both absent.
    Paired(String, String),
}

/// A compiled rule set: a root rule plus named definitions.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) title: Option<String>,
    pub(crate) root: Rule,
    pub(crate) definitions: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// Compile a rule set from a parsed schema document.
    pub fn from_json(doc: &Value) -> ConformResult<Self> {
        compile::compile_rule_set(doc)
    }

    /// Compile a rule set from schema document bytes.
    pub fn from_slice(bytes: &[u8]) -> ConformResult<Self> {
        let doc: Value = serde_json::from_slice(bytes).map_err(|e| {
            ConformError::invalid_rule_set("#", format!("not valid JSON: {e}"))
        })?;
        Self::from_json(&doc)
    }

    /// The shared EthPM v3 rule set, compiled on first use.
    pub fn ethpm_v3() -> ConformResult<&'static RuleSet> {
        static V3: OnceLock<Result<RuleSet, String>> = OnceLock::new();
        V3.get_or_init(|| {
            RuleSet::from_slice(ETHPM_V3_SCHEMA.as_bytes()).map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| ConformError::invalid_rule_set("ethpm-v3.spec.json", e.clone()))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn root(&self) -> &Rule {
        &self.root
    }

    pub fn definition(&self, name: &str) -> Option<&Rule> {
        self.definitions.get(name)
    }
}
