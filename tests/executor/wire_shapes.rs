//! Wire-shape tests: commands, entities, and errors as the transport
//! layer sees them.

use crate::common::*;
use miragedb::{
    Command, Entity, Error, Key, Mirage, Output, PathId, Query, RequestContext, Value,
};

#[test]
fn commit_command_decodes_from_protocol_shaped_json() {
    let json = r#"{
        "Commit": {
            "mode": "NON_TRANSACTIONAL",
            "mutations": [
                {
                    "upsert": {
                        "key": {
                            "partitionId": {"namespaceId": "tenant"},
                            "path": [{"kind": "Task", "name": "t1"}]
                        },
                        "properties": {
                            "priority": {"integerValue": "4"},
                            "done": {"booleanValue": false},
                            "title": {"stringValue": "write tests"}
                        }
                    }
                },
                {"delete": {"path": [{"kind": "Task", "id": "99"}]}}
            ]
        }
    }"#;

    let cmd: Command = serde_json::from_str(json).unwrap();
    let executor = create_executor();
    let output = executor.execute(&RequestContext::new(), cmd).unwrap();

    match output {
        Output::MutationResults { keys } => {
            assert_eq!(keys.len(), 2);
            assert_eq!(keys[0].namespace, "tenant");
            assert_eq!(keys[1].id(), Some(&PathId::Id(99)));
        }
        _ => panic!("expected MutationResults output"),
    }
}

#[test]
fn run_query_command_decodes_filters_orders_and_pagination() {
    let json = r#"{
        "RunQuery": {
            "query": {
                "kind": "Task",
                "filter": {
                    "compositeFilter": {
                        "op": "AND",
                        "filters": [
                            {
                                "propertyFilter": {
                                    "property": "priority",
                                    "op": "GREATER_THAN_OR_EQUAL",
                                    "value": {"integerValue": 2}
                                }
                            }
                        ]
                    }
                },
                "order": [{"property": "priority", "direction": "DESCENDING"}],
                "limit": 10
            }
        }
    }"#;

    let cmd: Command = serde_json::from_str(json).unwrap();
    let executor = create_executor();
    for (name, priority) in [("a", 1i64), ("b", 2), ("c", 3)] {
        executor
            .execute(
                &RequestContext::new(),
                Command::Commit {
                    database: None,
                    mode: miragedb::CommitMode::NonTransactional,
                    mutations: vec![miragedb::Mutation::Upsert(
                        Entity::new(Key::with_name("Task", name))
                            .with_property("priority", Value::Integer(priority)),
                    )],
                    transaction: None,
                },
            )
            .unwrap();
    }

    match executor.execute(&RequestContext::new(), cmd).unwrap() {
        Output::Query(results) => {
            let priorities: Vec<i64> = results
                .entities
                .iter()
                .filter_map(|e| e.property("priority")?.as_integer())
                .collect();
            assert_eq!(priorities, vec![3, 2]);
        }
        _ => panic!("expected Query output"),
    }
}

#[test]
fn unknown_value_payloads_survive_a_store_roundtrip_verbatim() {
    let json = r#"{
        "key": {"path": [{"kind": "Task", "name": "blob"}]},
        "properties": {
            "attachment": {"blobValue": "aGVsbG8="},
            "when": {"timestampValue": "2024-01-01T00:00:00Z"}
        }
    }"#;
    let entity: Entity = serde_json::from_str(json).unwrap();
    assert!(matches!(
        entity.property("attachment"),
        Some(Value::Unsupported(_))
    ));

    let db = Mirage::in_memory();
    db.upsert(entity.clone()).unwrap();
    let results = db.lookup(vec![entity.key.clone()]).unwrap();
    assert_eq!(results.found, vec![entity.clone()]);

    // Re-encoding reproduces the original payload byte for byte.
    let reencoded = serde_json::to_value(&results.found[0]).unwrap();
    assert_eq!(
        reencoded["properties"]["attachment"],
        serde_json::json!({"blobValue": "aGVsbG8="})
    );
}

#[test]
fn errors_serialize_with_code_and_message() {
    let db = Mirage::in_memory();
    db.insert(task("a")).unwrap();
    let err = db.insert(task("a")).unwrap_err();

    assert_eq!(err.code(), "ALREADY_EXISTS");
    assert!(err.to_string().contains("already exists"));

    let json = serde_json::to_string(&err).unwrap();
    let restored: Error = serde_json::from_str(&json).unwrap();
    assert_eq!(err, restored);
}

#[test]
fn output_serializes_for_the_transport() {
    let db = Mirage::in_memory();
    db.upsert(task("a")).unwrap();

    let output = db
        .executor()
        .execute(
            &RequestContext::new(),
            Command::RunQuery {
                database: None,
                namespace: None,
                query: Query::new("Task").with_limit(1),
            },
        )
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    let batch = &json["Query"];
    assert_eq!(batch["moreResults"], "NO_MORE_RESULTS");
    assert_eq!(
        batch["entities"][0]["key"]["path"][0]["kind"],
        "Task"
    );
}
