mod common;

use common::{conflict_block, conflicted_blog, TestEnv};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

#[test]
fn contracts_check() {
    let env = TestEnv::new(&["blog", "shop"]);
    conflicted_blog(&env);
    env.write_migration("shop", "0001_initial", &[]);

    let conflict = env.run_json_failing(&["check"]);
    assert_eq!(conflict["ok"], false);
    assert_eq!(conflict["data"][0]["kind"], "multi-head-conflict");
    assert_eq!(conflict["data"][0]["app"], Value::Null);
    validate("check.schema.json", &conflict["data"]);

    env.write_marker(
        "blog",
        &conflict_block("0002_author_nicknames", "0002_longer_titles"),
    );
    let rebase = env.run_json(&["rebase", "blog"]);
    assert_eq!(rebase["ok"], true);
    assert_eq!(rebase["data"]["new_name"], "0003_longer_titles");
    validate("rebase.schema.json", &rebase["data"]);

    let missing = env.run_json_failing(&["check"]);
    assert_eq!(missing["data"][0]["id"], "migline.E001");
    assert_eq!(missing["data"][0]["app"], "shop");
    validate("check.schema.json", &missing["data"]);

    let dry = env.run_json(&["create-markers", "--dry-run"]);
    assert_eq!(dry["data"]["dry_run"], true);
    assert_eq!(dry["data"]["actions"][0]["status"], "would_create");
    validate("create-markers.schema.json", &dry["data"]);

    let created = env.run_json(&["create-markers"]);
    assert_eq!(created["data"]["actions"][0]["app"], "shop");
    validate("create-markers.schema.json", &created["data"]);

    let clean = env.run_json(&["check"]);
    assert_eq!(clean["ok"], true);
    assert_eq!(clean["data"], Value::Array(vec![]));
    validate("check.schema.json", &clean["data"]);
}
