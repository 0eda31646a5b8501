mod common;

use common::*;
use serde_json::{json, Value};

fn with_meta(meta: Value) -> Value {
    with("meta", meta)
}

#[test]
fn rejects_invalid_meta_types() {
    for value in [json!(3), json!("metadata"), json!(["some", "metadata"])] {
        assert_violation(&with_meta(value), "meta", "type");
    }
}

#[test]
fn accepts_valid_meta_fields() {
    assert_valid(&with_meta(json!({"authors": ["list", "of", "authors"]})));
    assert_valid(&with_meta(json!({"license": "MIT"})));
    assert_valid(&with_meta(json!({"description": "this is a description."})));
    assert_valid(&with_meta(json!({"keywords": ["list", "of", "keywords"]})));
    assert_valid(&with_meta(json!({
        "links": {"website": "www.google.com", "documentation": "github.com"}
    })));
}

#[test]
fn rejects_invalid_authors_and_keywords() {
    for field in ["authors", "keywords"] {
        for value in [json!(3), json!("package"), json!({"first": "author"})] {
            assert_violation(&with_meta(json!({ field: value })), &format!("meta.{field}"), "type");
        }
    }
    assert_violation(&with_meta(json!({"authors": ["ok", 7]})), "meta.authors[1]", "type");
}

#[test]
fn rejects_invalid_license_and_description() {
    for field in ["license", "description"] {
        for value in [json!(3), json!(["list", "of", "things"]), json!({"first": "thing"})] {
            assert_violation(&with_meta(json!({ field: value })), &format!("meta.{field}"), "type");
        }
    }
}

#[test]
fn rejects_invalid_links() {
    for value in [json!(3), json!("link"), json!(["list", "of", "links"])] {
        assert_violation(&with_meta(json!({"links": value})), "meta.links", "type");
    }
    assert_violation(&with_meta(json!({"links": {"website": 1}})), "meta.links.website", "type");
}
