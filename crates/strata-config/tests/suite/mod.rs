mod schema_rules;
