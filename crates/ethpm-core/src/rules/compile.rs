//! Rule-set compiler.
//!
//! Turns a JSON schema document (a Draft-7 subset) into a [`RuleSet`]. Anything
//! the evaluator could not honor exactly is rejected here with a pointer into
//! the document, so a malformed rule set fails once, at load time, instead of
//! silently accepting manifests.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    Additional, ArrayRule, Dependency, Grammar, JsonKind, NumberRule, ObjectRule, Rule, RuleSet, StringRule,
};
use crate::errors::{ConformError, ConformResult};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Keywords carried for humans only.
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
    "version",
];

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "dependencies",
    "propertyNames",
    "patternProperties",
    "additionalProperties",
];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const NUMBER_KEYWORDS: &[&str] = &["minimum"];
const KEYWORD_GROUPS: [(JsonKind, &[&str]); 4] = [
    (JsonKind::Object, OBJECT_KEYWORDS),
    (JsonKind::Array, ARRAY_KEYWORDS),
    (JsonKind::String, STRING_KEYWORDS),
    (JsonKind::Number, NUMBER_KEYWORDS),
];
const OTHER_KEYWORDS: &[&str] = &["type", "enum", "const", "anyOf", "oneOf", "allOf", "$ref", "definitions"];

/// `patternProperties` keys that match every property name.
const CATCH_ALL_PATTERNS: &[&str] = &["", ".*", "^.*$"];

pub(crate) fn compile_rule_set(doc: &Value) -> ConformResult<RuleSet> {
    let obj = doc
        .as_object()
        .ok_or_else(|| ConformError::invalid_rule_set("#", "rule set must be a JSON object"))?;

    let mut definitions = BTreeMap::new();
    if let Some(defs) = obj.get("definitions") {
        let defs = defs
            .as_object()
            .ok_or_else(|| ConformError::invalid_rule_set("#/definitions", "expected an object"))?;
        for (name, def) in defs {
            let ptr = format!("{DEFINITIONS_PREFIX}{name}");
            definitions.insert(name.clone(), compile_node(def, &ptr, false)?);
        }
    }

    let root = compile_node(doc, "#", true)?;

    check_refs(&root, &definitions, "#")?;
    for (name, rule) in &definitions {
        check_refs(rule, &definitions, &format!("{DEFINITIONS_PREFIX}{name}"))?;
    }

    let title = obj.get("title").and_then(Value::as_str).map(str::to_string);
    debug!(
        title = title.as_deref().unwrap_or("<untitled>"),
        definitions = definitions.len(),
        "compiled rule set"
    );

    Ok(RuleSet {
        title,
        root,
        definitions,
    })
}

fn compile_node(v: &Value, ptr: &str, is_root: bool) -> ConformResult<Rule> {
    let obj = match v {
        Value::Bool(true) => return Ok(Rule::Any),
        Value::Object(o) => o,
        _ => return Err(ConformError::invalid_rule_set(ptr, "schema node must be an object or `true`")),
    };

    for key in obj.keys() {
        let k = key.as_str();
        let known = ANNOTATIONS.contains(&k)
            || OBJECT_KEYWORDS.contains(&k)
            || ARRAY_KEYWORDS.contains(&k)
            || STRING_KEYWORDS.contains(&k)
            || NUMBER_KEYWORDS.contains(&k)
            || OTHER_KEYWORDS.contains(&k);
        if !known {
            return Err(ConformError::invalid_rule_set(ptr, format!("unsupported keyword `{k}`")));
        }
    }
    if obj.contains_key("definitions") && !is_root {
        return Err(ConformError::invalid_rule_set(ptr, "`definitions` is only supported at the root"));
    }

    if let Some(r) = obj.get("$ref") {
        let r = r
            .as_str()
            .ok_or_else(|| ConformError::invalid_rule_set(ptr, "`$ref` must be a string"))?;
        let name = r.strip_prefix(DEFINITIONS_PREFIX).ok_or_else(|| {
            ConformError::invalid_rule_set(ptr, format!("unsupported reference `{r}`"))
        })?;
        return Ok(Rule::Ref(name.to_string()));
    }

    let mut parts = Vec::new();

    let mut allowed: Option<Vec<Value>> = match (obj.get("enum"), obj.get("const")) {
        (Some(_), Some(_)) => {
            return Err(ConformError::invalid_rule_set(ptr, "`enum` and `const` are mutually exclusive"))
        }
        (Some(Value::Array(values)), None) if !values.is_empty() => Some(values.clone()),
        (Some(_), None) => {
            return Err(ConformError::invalid_rule_set(
                format!("{ptr}/enum"),
                "expected a non-empty array",
            ))
        }
        (None, Some(c)) => Some(vec![c.clone()]),
        (None, None) => None,
    };

    match obj.get("type") {
        Some(Value::String(t)) => parts.push(compile_typed(t, obj, ptr, true)?),
        Some(Value::Array(types)) => {
            let mut alts = Vec::with_capacity(types.len());
            for t in types {
                let t = t.as_str().ok_or_else(|| {
                    ConformError::invalid_rule_set(format!("{ptr}/type"), "type names must be strings")
                })?;
                alts.push(compile_typed(t, obj, ptr, false)?);
            }
            parts.push(Rule::AnyOf(alts));
        }
        Some(_) => {
            return Err(ConformError::invalid_rule_set(
                format!("{ptr}/type"),
                "expected a string or an array of strings",
            ))
        }
        None => {
            for (kind, keywords) in KEYWORD_GROUPS {
                if keywords.iter().any(|k| obj.contains_key(*k)) {
                    let rule = compile_typed(kind.as_str(), obj, ptr, false)?;
                    parts.push(Rule::IfKind(kind, Box::new(rule)));
                }
            }
        }
    }

    let fold_into_string = matches!(parts.first(), Some(Rule::String(_)))
        && allowed.as_ref().is_some_and(|v| v.iter().all(Value::is_string));
    if fold_into_string {
        if let (Some(Rule::String(s)), Some(values)) = (parts.first_mut(), allowed.take()) {
            s.allowed = Some(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(x) => Some(x),
                        _ => None,
                    })
                    .collect(),
            );
        }
    }
    if let Some(values) = allowed {
        parts.push(Rule::Enum(values));
    }

    if let Some(alts) = obj.get("anyOf") {
        parts.push(Rule::AnyOf(compile_list(alts, &format!("{ptr}/anyOf"))?));
    }
    if let Some(alts) = obj.get("oneOf") {
        parts.push(Rule::OneOf(compile_list(alts, &format!("{ptr}/oneOf"))?));
    }
    if let Some(all) = obj.get("allOf") {
        parts.extend(compile_list(all, &format!("{ptr}/allOf"))?);
    }

    Ok(match parts.len() {
        0 => Rule::Any,
        1 => parts.remove(0),
        _ => Rule::AllOf(parts),
    })
}

fn compile_typed(t: &str, obj: &Map<String, Value>, ptr: &str, check_foreign: bool) -> ConformResult<Rule> {
    let family = match t {
        "object" | "array" | "string" | "boolean" | "null" => t,
        "number" | "integer" => "number",
        other => {
            return Err(ConformError::invalid_rule_set(
                format!("{ptr}/type"),
                format!("unknown type `{other}`"),
            ))
        }
    };
    if check_foreign {
        for (kind, keywords) in KEYWORD_GROUPS {
            if kind.as_str() == family {
                continue;
            }
            if let Some(k) = keywords.iter().find(|k| obj.contains_key(**k)) {
                return Err(ConformError::invalid_rule_set(
                    ptr,
                    format!("keyword `{k}` does not apply to type `{t}`"),
                ));
            }
        }
    }

    Ok(match t {
        "object" => Rule::Object(compile_object(obj, ptr)?),
        "array" => Rule::Array(ArrayRule {
            items: match obj.get("items") {
                Some(items @ (Value::Object(_) | Value::Bool(true))) => {
                    Some(Box::new(compile_node(items, &format!("{ptr}/items"), false)?))
                }
                Some(_) => {
                    return Err(ConformError::invalid_rule_set(
                        format!("{ptr}/items"),
                        "tuple-form `items` is not supported",
                    ))
                }
                None => None,
            },
            min_items: opt_usize(obj, "minItems", ptr)?,
        }),
        "string" => Rule::String(StringRule {
            min_length: opt_usize(obj, "minLength", ptr)?,
            max_length: opt_usize(obj, "maxLength", ptr)?,
            pattern: match obj.get("pattern") {
                Some(p) => {
                    let p = p.as_str().ok_or_else(|| {
                        ConformError::invalid_rule_set(format!("{ptr}/pattern"), "expected a string")
                    })?;
                    Some(Regex::new(p).map_err(|e| {
                        ConformError::invalid_rule_set(format!("{ptr}/pattern"), e.to_string())
                    })?)
                }
                None => None,
            },
            format: match obj.get("format") {
                Some(f) => {
                    let f = f.as_str().ok_or_else(|| {
                        ConformError::invalid_rule_set(format!("{ptr}/format"), "expected a string")
                    })?;
                    Some(Grammar::parse(f).ok_or_else(|| {
                        ConformError::invalid_rule_set(format!("{ptr}/format"), format!("unknown format `{f}`"))
                    })?)
                }
                None => None,
            },
            allowed: None,
        }),
        "number" | "integer" => Rule::Number(NumberRule {
            integer: t == "integer",
            minimum: match obj.get("minimum") {
                Some(m) => Some(m.as_f64().ok_or_else(|| {
                    ConformError::invalid_rule_set(format!("{ptr}/minimum"), "expected a number")
                })?),
                None => None,
            },
        }),
        "boolean" => Rule::Boolean,
        _ => Rule::Null,
    })
}

fn compile_object(obj: &Map<String, Value>, ptr: &str) -> ConformResult<ObjectRule> {
    let mut rule = ObjectRule::default();

    if let Some(props) = obj.get("properties") {
        let props = props.as_object().ok_or_else(|| {
            ConformError::invalid_rule_set(format!("{ptr}/properties"), "expected an object")
        })?;
        for (name, p) in props {
            let rule_p = compile_node(p, &format!("{ptr}/properties/{name}"), false)?;
            rule.properties.push((name.clone(), rule_p));
        }
    }

    if let Some(req) = obj.get("required") {
        rule.required = string_list(req, &format!("{ptr}/required"))?;
    }

    if let Some(deps) = obj.get("dependencies") {
        rule.dependencies = compile_dependencies(deps, &format!("{ptr}/dependencies"))?;
    }

    if let Some(names) = obj.get("propertyNames") {
        rule.property_names = Some(Box::new(compile_node(names, &format!("{ptr}/propertyNames"), false)?));
    }

    rule.additional = match obj.get("additionalProperties") {
        None | Some(Value::Bool(true)) => Additional::Allow,
        Some(Value::Bool(false)) => Additional::Deny,
        Some(v) => Additional::Rule(Box::new(compile_node(v, &format!("{ptr}/additionalProperties"), false)?)),
    };

    if let Some(pp) = obj.get("patternProperties") {
        let pp_ptr = format!("{ptr}/patternProperties");
        let pp = pp
            .as_object()
            .ok_or_else(|| ConformError::invalid_rule_set(&pp_ptr, "expected an object"))?;
        if pp.len() != 1 {
            return Err(ConformError::invalid_rule_set(&pp_ptr, "exactly one catch-all pattern is supported"));
        }
        for (pattern, v) in pp {
            if !CATCH_ALL_PATTERNS.contains(&pattern.as_str()) {
                return Err(ConformError::invalid_rule_set(
                    &pp_ptr,
                    format!("pattern `{pattern}` is not supported; use `propertyNames` to constrain keys"),
                ));
            }
            if !matches!(rule.additional, Additional::Allow) {
                return Err(ConformError::invalid_rule_set(
                    &pp_ptr,
                    "cannot be combined with `additionalProperties`",
                ));
            }
            rule.additional = Additional::Rule(Box::new(compile_node(v, &format!("{pp_ptr}/{pattern}"), false)?));
        }
    }

    Ok(rule)
}

/// Array-form dependencies. A pair of fields that require each other becomes
/// a single symmetric [`Dependency::Paired`].
fn compile_dependencies(v: &Value, ptr: &str) -> ConformResult<Vec<Dependency>> {
    let obj = v
        .as_object()
        .ok_or_else(|| ConformError::invalid_rule_set(ptr, "expected an object"))?;

    let mut raw: Vec<(String, Vec<String>)> = Vec::with_capacity(obj.len());
    for (field, reqs) in obj {
        if !reqs.is_array() {
            return Err(ConformError::invalid_rule_set(
                format!("{ptr}/{field}"),
                "only array-form dependencies are supported",
            ));
        }
        raw.push((field.clone(), string_list(reqs, &format!("{ptr}/{field}"))?));
    }

    let mut out = Vec::with_capacity(raw.len());
    for (field, reqs) in &raw {
        let paired_with = match reqs.as_slice() {
            [other] => raw
                .iter()
                .any(|(f, r)| f == other && r.len() == 1 && r[0] == *field)
                .then_some(other),
            _ => None,
        };
        match paired_with {
            Some(other) => {
                let seen = out.iter().any(|d| {
                    matches!(d, Dependency::Paired(a, b) if (a == other && b == field) || (a == field && b == other))
                });
                if !seen {
                    out.push(Dependency::Paired(field.clone(), other.clone()));
                }
            }
            None => out.push(Dependency::Requires {
                field: field.clone(),
                requires: reqs.clone(),
            }),
        }
    }
    Ok(out)
}

fn compile_list(v: &Value, ptr: &str) -> ConformResult<Vec<Rule>> {
    let arr = match v {
        Value::Array(a) if !a.is_empty() => a,
        _ => return Err(ConformError::invalid_rule_set(ptr, "expected a non-empty array")),
    };
    arr.iter()
        .enumerate()
        .map(|(i, node)| compile_node(node, &format!("{ptr}/{i}"), false))
        .collect()
}

fn string_list(v: &Value, ptr: &str) -> ConformResult<Vec<String>> {
    let arr = v
        .as_array()
        .ok_or_else(|| ConformError::invalid_rule_set(ptr, "expected an array of strings"))?;
    arr.iter()
        .map(|x| {
            x.as_str()
                .map(str::to_string)
                .ok_or_else(|| ConformError::invalid_rule_set(ptr, "expected an array of strings"))
        })
        .collect()
}

fn opt_usize(obj: &Map<String, Value>, key: &str, ptr: &str) -> ConformResult<Option<usize>> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ConformError::invalid_rule_set(format!("{ptr}/{key}"), "expected a non-negative integer")
            }),
    }
}

fn check_refs(rule: &Rule, defs: &BTreeMap<String, Rule>, ptr: &str) -> ConformResult<()> {
    match rule {
        Rule::Ref(name) if !defs.contains_key(name) => Err(ConformError::invalid_rule_set(
            ptr,
            format!("reference to missing definition `{name}`"),
        )),
        Rule::Array(a) => match &a.items {
            Some(items) => check_refs(items, defs, ptr),
            None => Ok(()),
        },
        Rule::Object(o) => {
            for (_, p) in &o.properties {
                check_refs(p, defs, ptr)?;
            }
            if let Some(names) = &o.property_names {
                check_refs(names, defs, ptr)?;
            }
            if let Additional::Rule(r) = &o.additional {
                check_refs(r, defs, ptr)?;
            }
            Ok(())
        }
        Rule::IfKind(_, r) => check_refs(r, defs, ptr),
        Rule::AnyOf(rs) | Rule::OneOf(rs) | Rule::AllOf(rs) => {
            rs.iter().try_for_each(|r| check_refs(r, defs, ptr))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn compile(doc: Value) -> ConformResult<RuleSet> {
        compile_rule_set(&doc)
    }

    #[test]
    fn properties_keep_declaration_order() {
        let rs = compile(json!({
            "type": "object",
            "properties": { "zeta": {"type": "string"}, "alpha": {"type": "string"} }
        }))
        .unwrap();
        let Rule::Object(o) = rs.root() else { panic!("object expected") };
        let names: Vec<_> = o.properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn mutual_dependencies_become_paired() {
        let rs = compile(json!({
            "type": "object",
            "dependencies": { "name": ["version"], "version": ["name"], "a": ["b"] }
        }))
        .unwrap();
        let Rule::Object(o) = rs.root() else { panic!("object expected") };
        assert_eq!(
            o.dependencies,
            vec![
                Dependency::Paired("name".into(), "version".into()),
                Dependency::Requires { field: "a".into(), requires: vec!["b".into()] },
            ]
        );
    }

    #[test]
    fn string_enum_folds_into_string_rule() {
        let rs = compile(json!({"type": "string", "enum": ["ethpm/3"]})).unwrap();
        assert_matches!(rs.root(), Rule::String(StringRule { allowed: Some(v), .. }) if v == &["ethpm/3"]);
    }

    #[test]
    fn type_with_union_becomes_all_of() {
        let rs = compile(json!({
            "type": "object",
            "anyOf": [{"required": ["a"]}, {"required": ["b"]}]
        }))
        .unwrap();
        assert_matches!(rs.root(), Rule::AllOf(parts) if parts.len() == 2);
    }

    #[test]
    fn missing_definition_is_fatal() {
        let err = compile(json!({"properties": {"x": {"$ref": "#/definitions/Nope"}}})).unwrap_err();
        assert_matches!(err, ConformError::InvalidRuleSet { .. });
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn malformed_rule_sets_are_fatal() {
        for doc in [
            json!([]),
            json!({"type": "widget"}),
            json!({"type": "string", "format": "email"}),
            json!({"type": "string", "pattern": "("}),
            json!({"type": "string", "properties": {}}),
            json!({"not": {"required": ["x"]}}),
            json!({"patternProperties": {"^0x": {}}}),
            json!({"dependencies": {"a": {"required": ["b"]}}}),
            json!({"properties": {"x": {"definitions": {}}}}),
            json!({"enum": []}),
        ] {
            assert_matches!(compile(doc.clone()), Err(ConformError::InvalidRuleSet { .. }), "{doc}");
        }
    }

    #[test]
    fn catch_all_pattern_properties_apply_to_values() {
        let rs = compile(json!({"patternProperties": {"": {"type": "string"}}})).unwrap();
        let Rule::IfKind(JsonKind::Object, inner) = rs.root() else { panic!("object guard expected") };
        let Rule::Object(o) = inner.as_ref() else { panic!("object expected") };
        assert_matches!(o.additional, Additional::Rule(_));
    }

    #[test]
    fn typeless_keywords_guard_each_kind() {
        let rs = compile(json!({"minLength": 3, "minimum": 1, "required": ["a"]})).unwrap();
        let Rule::AllOf(parts) = rs.root() else { panic!("all-of expected") };
        let kinds: Vec<_> = parts
            .iter()
            .filter_map(|p| match p {
                Rule::IfKind(kind, _) => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, [JsonKind::Object, JsonKind::String, JsonKind::Number]);
    }

    #[test]
    fn typed_node_still_rejects_foreign_keywords() {
        let err = compile(json!({"type": "integer", "minLength": 3})).unwrap_err();
        assert!(err.to_string().contains("minLength"));
    }
}
