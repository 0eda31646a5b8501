//! Structural and semantic validation of manifest documents.
//!
//! One generic evaluator walks a compiled [`RuleSet`] in lock-step with the
//! document and collects every violation it finds:
//! - a type mismatch is reported at the field and stops descent into it
//! - sibling fields never short-circuit each other
//! - declared properties are visited in rule-set order, undeclared keys in
//!   sorted order, so identical input always yields identical output
//! - cross-references between collections are not resolved
//!
//! Only an unusable rule set or a non-object document aborts the call; every
//! other problem becomes a [`Violation`].

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::LimitsConfig;
use crate::errors::{json_type_name, ConformError, ConformResult};
use crate::rules::{Additional, ArrayRule, Dependency, NumberRule, ObjectRule, Rule, RuleSet, StringRule};

/// Constraint ids produced by the evaluator itself. Grammar violations use the
/// grammar name instead.
pub mod constraint {
    pub const TYPE: &str = "type";
    pub const REQUIRED: &str = "required";
    pub const ENUM: &str = "enum";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const PATTERN: &str = "pattern";
    pub const MIN_ITEMS: &str = "minItems";
    pub const MINIMUM: &str = "minimum";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const DEPENDENCIES_PAIRED: &str = "dependencies.paired";
    pub const ANY_OF: &str = "anyOf";
    pub const ONE_OF: &str = "oneOf";
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Dotted location, `[i]` for array items; empty for the document root.
    pub path: String,
    pub message: String,
    pub constraint_id: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>, constraint_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            constraint_id: constraint_id.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "{path}: {} [{}]", self.message, self.constraint_id)
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "violations", rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid(Vec<Violation>),
}

impl Verdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(v) => v,
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(v) => v,
        }
    }
}

/// Validate `document` against `rules` with default limits.
pub fn validate(document: &Value, rules: &RuleSet) -> ConformResult<Verdict> {
    validate_with_limits(document, rules, &LimitsConfig::default())
}

/// Validate `document` against `rules`.
pub fn validate_with_limits(document: &Value, rules: &RuleSet, limits: &LimitsConfig) -> ConformResult<Verdict> {
    if !document.is_object() {
        return Err(ConformError::NotAnObject {
            found: json_type_name(document),
        });
    }

    let eval = Evaluator {
        rules,
        max_depth: limits.max_rule_depth,
    };
    let mut out = Vec::new();
    eval.eval(rules.root(), document, "", 0, &mut out)?;

    debug!(
        rule_set = rules.title().unwrap_or("<untitled>"),
        violations = out.len(),
        "validated manifest"
    );
    Ok(Verdict::from_violations(out))
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn join_index(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

struct Evaluator<'r> {
    rules: &'r RuleSet,
    max_depth: usize,
}

impl<'r> Evaluator<'r> {
    fn eval(&self, rule: &Rule, value: &Value, path: &str, depth: usize, out: &mut Vec<Violation>) -> ConformResult<()> {
        if depth > self.max_depth {
            return Err(ConformError::invalid_rule_set(
                path,
                format!("rule nesting exceeds {} levels (reference cycle?)", self.max_depth),
            ));
        }

        match rule {
            Rule::Any => {}
            Rule::Null => {
                if !value.is_null() {
                    out.push(type_violation(path, "null", value));
                }
            }
            Rule::Boolean => {
                if !value.is_boolean() {
                    out.push(type_violation(path, "boolean", value));
                }
            }
            Rule::Number(n) => self.eval_number(n, value, path, out),
            Rule::String(s) => self.eval_string(s, value, path, out),
            Rule::Array(a) => self.eval_array(a, value, path, depth, out)?,
            Rule::Object(o) => self.eval_object(o, value, path, depth, out)?,
            Rule::Enum(values) => {
                if !values.contains(value) {
                    let allowed = values.iter().map(Value::to_string).join(", ");
                    out.push(Violation::new(
                        path,
                        format!("must be one of {allowed}, found {value}"),
                        constraint::ENUM,
                    ));
                }
            }
            Rule::AnyOf(alts) => {
                let mut failures = Vec::with_capacity(alts.len());
                for alt in alts {
                    let mut scratch = Vec::new();
                    self.eval(alt, value, path, depth + 1, &mut scratch)?;
                    if scratch.is_empty() {
                        return Ok(());
                    }
                    failures.push(scratch);
                }
                out.push(Violation::new(
                    path,
                    format!("must satisfy at least one of: {}", summarize(&failures)),
                    constraint::ANY_OF,
                ));
            }
            Rule::OneOf(alts) => {
                let mut failures = Vec::new();
                let mut matched = 0usize;
                for alt in alts {
                    let mut scratch = Vec::new();
                    self.eval(alt, value, path, depth + 1, &mut scratch)?;
                    if scratch.is_empty() {
                        matched += 1;
                    } else {
                        failures.push(scratch);
                    }
                }
                match matched {
                    1 => {}
                    0 => out.push(Violation::new(
                        path,
                        format!("must satisfy exactly one of: {}", summarize(&failures)),
                        constraint::ONE_OF,
                    )),
                    n => out.push(Violation::new(
                        path,
                        format!("matches {n} alternatives, expected exactly one"),
                        constraint::ONE_OF,
                    )),
                }
            }
            Rule::AllOf(parts) => {
                for part in parts {
                    let before = out.len();
                    self.eval(part, value, path, depth + 1, out)?;
                    // A wrong type makes the remaining parts meaningless.
                    if out[before..]
                        .iter()
                        .any(|v| v.path == path && v.constraint_id == constraint::TYPE)
                    {
                        break;
                    }
                }
            }
            Rule::Ref(name) => {
                let target = self.rules.definition(name).ok_or_else(|| {
                    ConformError::invalid_rule_set(
                        format!("#/definitions/{name}"),
                        "reference to missing definition",
                    )
                })?;
                self.eval(target, value, path, depth + 1, out)?;
            }
            Rule::IfKind(kind, inner) => {
                if kind.matches(value) {
                    self.eval(inner, value, path, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }

    fn eval_number(&self, rule: &NumberRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
        let Value::Number(n) = value else {
            let expected = if rule.integer { "integer" } else { "number" };
            out.push(type_violation(path, expected, value));
            return;
        };
        let as_f64 = n.as_f64().unwrap_or(f64::NAN);
        if rule.integer && !(n.is_i64() || n.is_u64() || as_f64.fract() == 0.0) {
            out.push(type_violation(path, "integer", value));
            return;
        }
        if let Some(min) = rule.minimum {
            if as_f64 < min {
                out.push(Violation::new(
                    path,
                    format!("must be at least {min}, found {n}"),
                    constraint::MINIMUM,
                ));
            }
        }
    }

    fn eval_string(&self, rule: &StringRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
        let Some(s) = value.as_str() else {
            out.push(type_violation(path, "string", value));
            return;
        };

        if let Some(allowed) = &rule.allowed {
            if !allowed.iter().any(|a| a == s) {
                let list = allowed.iter().map(|a| format!("`{a}`")).join(", ");
                out.push(Violation::new(
                    path,
                    format!("must be one of {list}, found `{s}`"),
                    constraint::ENUM,
                ));
            }
        }

        let len = s.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                let message = if min == 1 {
                    "must not be empty".to_string()
                } else {
                    format!("must be at least {min} characters long")
                };
                out.push(Violation::new(path, message, constraint::MIN_LENGTH));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                out.push(Violation::new(
                    path,
                    format!("must be at most {max} characters long, found {len}"),
                    constraint::MAX_LENGTH,
                ));
            }
        }
        if let Some(re) = &rule.pattern {
            if !re.is_match(s) {
                out.push(Violation::new(
                    path,
                    format!("`{s}` does not match pattern `{}`", re.as_str()),
                    constraint::PATTERN,
                ));
            }
        }
        if let Some(g) = rule.format {
            if !g.matches(s) {
                out.push(Violation::new(path, format!("`{s}` is not {}", g.describe()), g.name()));
            }
        }
    }

    fn eval_array(
        &self,
        rule: &ArrayRule,
        value: &Value,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) -> ConformResult<()> {
        let Some(items) = value.as_array() else {
            out.push(type_violation(path, "array", value));
            return Ok(());
        };
        if let Some(min) = rule.min_items {
            if items.len() < min {
                out.push(Violation::new(
                    path,
                    format!("must contain at least {min} items, found {}", items.len()),
                    constraint::MIN_ITEMS,
                ));
            }
        }
        if let Some(item_rule) = &rule.items {
            for (i, item) in items.iter().enumerate() {
                self.eval(item_rule, item, &join_index(path, i), depth + 1, out)?;
            }
        }
        Ok(())
    }

    fn eval_object(
        &self,
        rule: &ObjectRule,
        value: &Value,
        path: &str,
        depth: usize,
        out: &mut Vec<Violation>,
    ) -> ConformResult<()> {
        let Some(map) = value.as_object() else {
            out.push(type_violation(path, "object", value));
            return Ok(());
        };

        for (name, prop_rule) in &rule.properties {
            match map.get(name) {
                Some(v) => self.eval(prop_rule, v, &join_key(path, name), depth + 1, out)?,
                None if rule.required.contains(name) => out.push(missing(path, name)),
                None => {}
            }
        }
        for name in &rule.required {
            if rule.property(name).is_none() && !map.contains_key(name) {
                out.push(missing(path, name));
            }
        }

        eval_dependencies(&rule.dependencies, map, path, out);

        for (key, v) in map.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            let key_path = join_key(path, key);
            if let Some(names) = &rule.property_names {
                let mut scratch = Vec::new();
                self.eval(names, &Value::String(key.clone()), &key_path, depth + 1, &mut scratch)?;
                out.extend(scratch.into_iter().map(|mut k| {
                    k.message = format!("invalid key: {}", k.message);
                    k
                }));
            }
            if rule.property(key).is_some() {
                continue;
            }
            match &rule.additional {
                Additional::Allow => {}
                Additional::Deny => out.push(Violation::new(
                    key_path,
                    format!("unexpected field `{key}`"),
                    constraint::ADDITIONAL_PROPERTIES,
                )),
                Additional::Rule(r) => self.eval(r, v, &key_path, depth + 1, out)?,
            }
        }
        Ok(())
    }
}

fn eval_dependencies(deps: &[Dependency], map: &Map<String, Value>, path: &str, out: &mut Vec<Violation>) {
    for dep in deps {
        match dep {
            Dependency::Paired(a, b) => {
                let missing_pair = match (map.contains_key(a), map.contains_key(b)) {
                    (true, false) => Some((a, b)),
                    (false, true) => Some((b, a)),
                    _ => None,
                };
                if let Some((present, absent)) = missing_pair {
                    out.push(Violation::new(
                        join_key(path, absent),
                        format!(
                            "`{absent}` is required when `{present}` is present: \
                             `{a}` and `{b}` must both be present or both be absent"
                        ),
                        constraint::DEPENDENCIES_PAIRED,
                    ));
                }
            }
            Dependency::Requires { field, requires } => {
                if !map.contains_key(field) {
                    continue;
                }
                for r in requires.iter().filter(|r| !map.contains_key(*r)) {
                    out.push(Violation::new(
                        join_key(path, r),
                        format!("`{r}` is required when `{field}` is present"),
                        constraint::DEPENDENCIES,
                    ));
                }
            }
        }
    }
}

fn type_violation(path: &str, expected: &str, found: &Value) -> Violation {
    Violation::new(
        path,
        format!("expected {expected}, found {}", json_type_name(found)),
        constraint::TYPE,
    )
}

fn missing(path: &str, name: &str) -> Violation {
    Violation::new(
        join_key(path, name),
        format!("missing required field `{name}`"),
        constraint::REQUIRED,
    )
}

/// First message of every failed alternative, in alternative order.
fn summarize(failures: &[Vec<Violation>]) -> String {
    failures
        .iter()
        .filter_map(|f| f.first())
        .map(|v| v.message.as_str())
        .join("; ")
}
