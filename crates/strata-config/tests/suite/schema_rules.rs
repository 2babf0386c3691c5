use strata_config::json_schema;

fn schema_value() -> serde_json::Value {
    serde_json::to_value(json_schema()).expect("schema serializes")
}

#[test]
fn cache_limit_has_a_lower_bound() {
    let value = schema_value();
    let max_entries = value
        .pointer("/definitions/CacheOptions/properties/max_entries")
        .expect("max_entries schema property exists");
    assert_eq!(max_entries.get("minimum").and_then(|v| v.as_f64()), Some(1.0));
}

#[test]
fn logging_level_must_not_be_empty() {
    let value = schema_value();
    let level = value
        .pointer("/definitions/LoggingConfig/properties/level")
        .expect("level schema property exists");
    assert_eq!(level.get("minLength").and_then(|v| v.as_u64()), Some(1));
}

#[test]
fn unknown_keys_are_disallowed() {
    let value = schema_value();
    for definition in ["LoggingConfig", "CacheOptions"] {
        let additional = value
            .pointer(&format!("/definitions/{definition}/additionalProperties"))
            .unwrap_or_else(|| panic!("{definition} restricts additional properties"));
        assert_eq!(additional, &serde_json::Value::Bool(false));
    }
}
