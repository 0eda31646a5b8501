mod common;

use common::*;
use serde_json::{json, Value};

fn deployment(instance: &str, body: Value) -> Value {
    with("deployments", json!({ BLOCKCHAIN_URI: { instance: body } }))
}

fn instance_path(instance: &str, field: &str) -> String {
    format!("deployments.{BLOCKCHAIN_URI}.{instance}.{field}")
}

#[test]
fn accepts_valid_deployments() {
    assert_valid(&deployment("MyContract", json!({"contractType": "MyContract", "address": ADDRESS})));
    assert_valid(&deployment(
        "MyContract",
        json!({"contractType": "nested:MyContract", "address": ADDRESS}),
    ));
    assert_valid(&deployment(
        "MyContract",
        json!({
            "contractType": "nested:MyContract",
            "address": ADDRESS,
            "block": BLOCK_HASH,
            "transaction": TX_HASH
        }),
    ));
    for reference in ["Wallet[mainnet]", "dep:Wallet[mainnet]", "dep:Wallet"] {
        assert_valid(&deployment("Wallet", json!({"contractType": reference, "address": ADDRESS})));
    }
}

#[test]
fn nested_contract_types_are_not_cross_checked() {
    // No `contractTypes` at all, and no build dependency named `nested`.
    let doc = deployment(
        "MyContract",
        json!({"contractType": "multiple:nested:MyContract", "address": ADDRESS}),
    );
    assert!(doc.get("contractTypes").is_none());
    assert_valid(&doc);
}

#[test]
fn rejects_invalid_blockchain_uri() {
    let doc = with(
        "deployments",
        json!({"blockchain://abc/block/123": {"MyContract": {"contractType": "MyContract", "address": ADDRESS}}}),
    );
    let v = assert_violation(&doc, "deployments.blockchain://abc/block/123", "blockchain-uri");
    assert!(v.message.starts_with("invalid key: "));
}

#[test]
fn rejects_missing_required_fields() {
    assert_violation(
        &deployment("MyContract", json!({"contractType": "MyContract"})),
        &instance_path("MyContract", "address"),
        "required",
    );
    assert_violation(
        &deployment("MyContract", json!({"address": ADDRESS})),
        &instance_path("MyContract", "contractType"),
        "required",
    );
}

#[test]
fn rejects_invalid_instance_names() {
    let doc = deployment(".MyContract", json!({"contractType": "MyContract", "address": ADDRESS}));
    assert_violation(
        &doc,
        &format!("deployments.{BLOCKCHAIN_URI}..MyContract"),
        "contract-instance-name",
    );
    let doc = deployment("My-Contract", json!({"contractType": "MyContract", "address": ADDRESS}));
    assert_violation(
        &doc,
        &format!("deployments.{BLOCKCHAIN_URI}.My-Contract"),
        "contract-instance-name",
    );
}

#[test]
fn rejects_invalid_contract_type_references() {
    for value in [".MyContract", "-nested:MyContract", "nested:", ""] {
        assert_violation(
            &deployment("MyContract", json!({"contractType": value, "address": ADDRESS})),
            &instance_path("MyContract", "contractType"),
            "contract-type-reference",
        );
    }
}

#[test]
fn rejects_invalid_hashes_and_addresses() {
    let body = |field: &str, value: &str| {
        let mut b = json!({"contractType": "MyContract", "address": ADDRESS});
        b[field] = json!(value);
        deployment("MyContract", b)
    };
    assert_violation(&body("transaction", "0x123"), &instance_path("MyContract", "transaction"), "transaction-hash");
    assert_violation(&body("block", "0x123"), &instance_path("MyContract", "block"), "block-hash");
    assert_violation(&body("address", "0x123"), &instance_path("MyContract", "address"), "address");
    assert_violation(
        &body("address", &ADDRESS[2..]),
        &instance_path("MyContract", "address"),
        "address",
    );
}

#[test]
fn instance_runtime_bytecode_is_checked() {
    let doc = deployment(
        "MyContract",
        json!({"contractType": "MyContract", "address": ADDRESS, "runtimeBytecode": {"bytecode": "0xabc"}}),
    );
    assert_violation(&doc, &instance_path("MyContract", "runtimeBytecode.bytecode"), "byte-string");
}
