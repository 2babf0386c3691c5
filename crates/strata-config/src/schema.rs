use schemars::schema::{RootSchema, Schema};
use schemars::schema_for;

use crate::StrataConfig;

/// JSON schema for `strata.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(StrataConfig);
    schema.schema.metadata().title = Some("Strata configuration".to_owned());
    require_non_empty_string(&mut schema, "LoggingConfig", "level");
    schema
}

// An empty `logging.level` silently falls back to `info`; flag it in editors instead.
fn require_non_empty_string(schema: &mut RootSchema, definition_name: &str, property_name: &str) {
    let Some(Schema::Object(definition)) = schema.definitions.get_mut(definition_name) else {
        return;
    };
    let Some(Schema::Object(property)) = definition.object().properties.get_mut(property_name)
    else {
        return;
    };
    property.string().min_length = Some(1);
}
