//! Query evaluation through the public API.

use crate::common::*;
use miragedb::{
    Direction, Entity, EntityStore, Filter, Key, MoreResults, Operator, PathElement, Query, Value,
};

#[test]
fn kind_query_sorts_ascending_by_canonical_key_regardless_of_insertion_order() {
    let store = EntityStore::new();
    for name in ["zebra", "apple", "mango", "banana"] {
        seed(&store, vec![task(name)]);
    }

    let results = store.run_query(&Query::new("Task")).unwrap();
    assert_eq!(names(&results), vec!["apple", "banana", "mango", "zebra"]);
}

#[test]
fn kind_query_excludes_deleted_and_other_kinds() {
    let store = EntityStore::new();
    seed(&store, vec![task("keep"), task("drop")]);
    seed(
        &store,
        vec![Entity::new(Key::with_name("Note", "other"))],
    );
    store
        .commit(
            miragedb::CommitMode::NonTransactional,
            vec![miragedb::Mutation::Delete(Key::with_name("Task", "drop"))],
            None,
        )
        .unwrap();

    let results = store.run_query(&Query::new("Task")).unwrap();
    assert_eq!(names(&results), vec!["keep"]);
}

#[test]
fn limited_query_pages_through_all_matches_exactly_once() {
    let store = EntityStore::new();
    let all: Vec<String> = (0..7).map(|i| format!("task-{}", i)).collect();
    seed(&store, all.iter().map(|name| task(name)).collect());

    let first = store.run_query(&Query::new("Task").with_limit(4)).unwrap();
    assert_eq!(first.entities.len(), 4);
    assert_eq!(first.more_results, MoreResults::MoreResultsAfterLimit);
    let cursor = first.end_cursor.clone().expect("truncated page carries a cursor");

    let second = store
        .run_query(&Query::new("Task").with_limit(4).with_cursor(cursor))
        .unwrap();
    assert_eq!(second.entities.len(), 3);
    assert_eq!(second.more_results, MoreResults::NoMoreResults);
    assert!(second.end_cursor.is_none());

    let mut seen = names(&first);
    seen.extend(names(&second));
    assert_eq!(seen, all);
}

#[test]
fn filters_compose_over_properties_and_keys() {
    let store = EntityStore::new();
    let entity = |name: &str, priority: i64| {
        Entity::new(Key::with_name("Task", name))
            .with_property("name", Value::Str(name.to_string()))
            .with_property("priority", Value::Integer(priority))
    };
    seed(
        &store,
        vec![entity("a", 1), entity("b", 2), entity("c", 3), entity("d", 4)],
    );

    let query = Query::new("Task").with_filter(Filter::and(vec![
        Filter::property("priority", Operator::GreaterThan, Value::Integer(1)),
        Filter::key(Operator::LessThan, Key::with_name("Task", "d")),
    ]));
    assert_eq!(names(&store.run_query(&query).unwrap()), vec!["b", "c"]);
}

#[test]
fn ancestor_query_returns_subtree() {
    let store = EntityStore::new();
    let list = Key::with_name("List", "groceries");
    let milk = list.child(PathElement::with_name("Task", "milk"));
    let eggs = list.child(PathElement::with_name("Task", "eggs"));
    let unrelated = Key::with_name("List", "chores")
        .child(PathElement::with_name("Task", "sweep"));
    seed(
        &store,
        vec![
            Entity::new(list.clone()),
            Entity::new(milk.clone()),
            Entity::new(eggs.clone()),
            Entity::new(unrelated),
        ],
    );

    let results = store
        .run_query(&Query::new("Task").with_filter(Filter::has_ancestor(list)))
        .unwrap();
    let keys: Vec<Key> = results.entities.into_iter().map(|e| e.key).collect();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&milk));
    assert!(keys.contains(&eggs));
}

#[test]
fn explicit_order_with_offset_and_keys_only() {
    let store = EntityStore::new();
    let entity = |name: &str, priority: i64| {
        Entity::new(Key::with_name("Task", name))
            .with_property("name", Value::Str(name.to_string()))
            .with_property("priority", Value::Integer(priority))
    };
    seed(&store, vec![entity("a", 3), entity("b", 1), entity("c", 2)]);

    let query = Query::new("Task")
        .order_by("priority", Direction::Descending)
        .with_offset(1)
        .keys_only();
    let results = store.run_query(&query).unwrap();

    // Descending priority: a(3), c(2), b(1); offset skips a.
    let keys: Vec<Key> = results.entities.iter().map(|e| e.key.clone()).collect();
    assert_eq!(
        keys,
        vec![Key::with_name("Task", "c"), Key::with_name("Task", "b")]
    );
    assert!(results.entities.iter().all(|e| e.properties.is_empty()));
}

#[test]
fn aggregation_count_follows_the_nested_query() {
    let store = EntityStore::new();
    seed(&store, vec![task("a"), task("b"), task("c")]);

    assert_eq!(store.run_aggregation_query(&Query::new("Task")).unwrap(), 3);
    assert_eq!(
        store
            .run_aggregation_query(&Query::new("Task").with_limit(2))
            .unwrap(),
        2
    );
    assert_eq!(store.run_aggregation_query(&Query::new("Note")).unwrap(), 0);
}
