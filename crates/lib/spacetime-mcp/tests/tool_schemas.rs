use serde_json::Value;
use spacetime_core::control::{PublishConfig, SpacetimeControlPlane};
use spacetime_core::remote::{HttpRemote, RemoteConfig};
use spacetime_mcp::{DATABASE_PARAM, SpacetimeMcp, ToolConfig};

const EXPECTED_TOOLS: [&str; 13] = [
    "add_database_name",
    "call_reducer",
    "delete_database",
    "execute_sql",
    "get_database_identity",
    "get_database_info",
    "get_database_names",
    "get_logs",
    "get_schema",
    "help",
    "list_databases",
    "ping",
    "publish_module",
];

fn server(default_database: Option<&str>) -> SpacetimeMcp {
    let remote = HttpRemote::new(&RemoteConfig::new("http://localhost:3000"))
        .expect("remote should build");
    let control = SpacetimeControlPlane::new(remote, PublishConfig::default());
    SpacetimeMcp::new(control, ToolConfig::new(default_database.map(str::to_string)))
}

fn required(schema: &serde_json::Map<String, Value>) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn declares_database(schema: &serde_json::Map<String, Value>) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| properties.contains_key(DATABASE_PARAM))
}

#[test]
fn every_tool_is_registered() {
    let mut names: Vec<String> = server(None)
        .tools()
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect();
    names.sort();
    assert_eq!(names, EXPECTED_TOOLS);
}

#[test]
fn database_is_required_without_a_default() {
    let tools = server(None).tools();
    let scoped: Vec<_> = tools
        .iter()
        .filter(|tool| declares_database(&tool.input_schema))
        .collect();
    assert_eq!(scoped.len(), 10);
    for tool in scoped {
        assert!(
            required(&tool.input_schema).contains(&DATABASE_PARAM.to_string()),
            "{} should require database",
            tool.name
        );
    }
}

#[test]
fn database_is_optional_with_a_default() {
    for tool in server(Some("chat")).tools() {
        assert!(
            !required(&tool.input_schema).contains(&DATABASE_PARAM.to_string()),
            "{} should not require database",
            tool.name
        );
    }
}

#[test]
fn other_required_fields_survive() {
    let tools = server(None).tools();
    let execute_sql = tools
        .iter()
        .find(|tool| tool.name == "execute_sql")
        .expect("execute_sql should be registered");
    let required = required(&execute_sql.input_schema);
    assert!(required.contains(&"query".to_string()));
    assert!(required.contains(&DATABASE_PARAM.to_string()));

    let list = tools
        .iter()
        .find(|tool| tool.name == "list_databases")
        .expect("list_databases should be registered");
    assert!(!declares_database(&list.input_schema));
}

#[test]
fn blank_default_database_counts_as_unset() {
    assert_eq!(ToolConfig::new(Some("   ".to_string())).default_database, None);
    assert_eq!(
        ToolConfig::new(Some(" chat ".to_string())).default_database.as_deref(),
        Some("chat")
    );
}
