//! Tests for source module

use super::*;
use crate::query::{FetchDescriptor, Filter, SortKey};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: i64,
    name: String,
    age: i64,
}

fn people() -> Vec<Person> {
    vec![
        Person { id: 1, name: "Anna".into(), age: 34 },
        Person { id: 2, name: "Bob".into(), age: 19 },
        Person { id: 3, name: "Cleo".into(), age: 34 },
        Person { id: 4, name: "Dan".into(), age: 52 },
        Person { id: 5, name: "Eve".into(), age: 27 },
    ]
}

fn ids(records: &[Person]) -> Vec<i64> {
    records.iter().map(|p| p.id).collect()
}

// ============================================================================
// MemorySource Tests
// ============================================================================

#[tokio::test]
async fn test_memory_count_and_fetch_unfiltered() {
    let source = MemorySource::new(people());
    let descriptor = FetchDescriptor::new();

    assert_eq!(source.count(&descriptor).await.unwrap(), 5);

    let page = source.fetch(&descriptor, 1, 2).await.unwrap();
    assert_eq!(ids(&page), vec![2, 3]);

    let tail = source.fetch(&descriptor, 4, 10).await.unwrap();
    assert_eq!(ids(&tail), vec![5]);

    let past_end = source.fetch(&descriptor, 9, 10).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_memory_filter_and_sort() {
    let source = MemorySource::new(people());
    let descriptor = FetchDescriptor::new()
        .with_filter(Filter::gte("age", 27))
        .sorted_by(SortKey::desc("age"))
        .sorted_by(SortKey::asc("name"));

    assert_eq!(source.count(&descriptor).await.unwrap(), 4);

    let all = source.fetch(&descriptor, 0, 10).await.unwrap();
    assert_eq!(ids(&all), vec![4, 1, 3, 5]);

    let second_page = source.fetch(&descriptor, 2, 2).await.unwrap();
    assert_eq!(ids(&second_page), vec![3, 5]);
}

#[tokio::test]
async fn test_memory_sort_is_stable() {
    let source = MemorySource::new(people());
    let descriptor = FetchDescriptor::new().sorted_by(SortKey::asc("age"));

    let all = source.fetch(&descriptor, 0, 10).await.unwrap();
    // Anna and Cleo share an age and keep insertion order
    assert_eq!(ids(&all), vec![2, 5, 1, 3, 4]);
}

#[tokio::test]
async fn test_memory_clones_share_storage() {
    let source = MemorySource::new(people());
    let writer = source.clone();

    writer
        .push(Person { id: 6, name: "Finn".into(), age: 40 })
        .await;
    assert_eq!(source.len().await, 6);

    writer.retain(|p| p.age > 30).await;
    assert_eq!(source.count(&FetchDescriptor::new()).await.unwrap(), 4);

    writer.clear().await;
    assert!(source.is_empty().await);
}

#[tokio::test]
async fn test_memory_json_records() {
    let source = MemorySource::new(vec![
        json!({"id": 1, "tags": {"color": "red"}}),
        json!({"id": 2, "tags": {"color": "blue"}}),
        json!({"id": 3}),
    ]);
    let descriptor = FetchDescriptor::new().with_filter(Filter::eq("tags.color", "blue"));

    let page = source.fetch(&descriptor, 0, 10).await.unwrap();
    assert_eq!(page, vec![json!({"id": 2, "tags": {"color": "blue"}})]);

    let missing = FetchDescriptor::new().with_filter(Filter::is_null("tags"));
    assert_eq!(source.count(&missing).await.unwrap(), 1);
}

#[tokio::test]
async fn test_memory_serialize_failure_is_decode_error() {
    #[derive(Clone)]
    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: serde::Serializer>(
            &self,
            _serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    let source = MemorySource::new(vec![Opaque]);
    let err = source
        .fetch(&FetchDescriptor::new(), 0, 10)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, crate::Error::Decode { .. }));
    assert!(err.to_string().contains("not representable"));
}

// ============================================================================
// DuckDbSource Tests
// ============================================================================

fn duck_people() -> DuckDbSource<Person> {
    let source = DuckDbSource::open_in_memory("people").unwrap();
    source
        .execute_batch(
            "CREATE TABLE people (id BIGINT, name VARCHAR, age BIGINT);
             INSERT INTO people VALUES
                (1, 'Anna', 34), (2, 'Bob', 19), (3, 'Cleo', 34), (4, 'Dan', 52), (5, 'Eve', 27);",
        )
        .unwrap();
    source
}

#[tokio::test]
async fn test_duckdb_count_and_fetch() {
    let source = duck_people();
    let descriptor = FetchDescriptor::new().sorted_by(SortKey::asc("id"));

    assert_eq!(source.count(&descriptor).await.unwrap(), 5);

    let page = source.fetch(&descriptor, 0, 2).await.unwrap();
    assert_eq!(page, people()[..2].to_vec());

    let tail = source.fetch(&descriptor, 4, 2).await.unwrap();
    assert_eq!(ids(&tail), vec![5]);
}

#[tokio::test]
async fn test_duckdb_filter_and_sort() {
    let source = duck_people();
    let descriptor = FetchDescriptor::new()
        .with_filter(Filter::and(vec![
            Filter::gte("age", 27),
            Filter::not(Filter::contains("name", "Dan")),
        ]))
        .sorted_by(SortKey::desc("age"))
        .sorted_by(SortKey::asc("name"));

    assert_eq!(source.count(&descriptor).await.unwrap(), 3);

    let all = source.fetch(&descriptor, 0, 10).await.unwrap();
    assert_eq!(ids(&all), vec![1, 3, 5]);
}

#[tokio::test]
async fn test_duckdb_decode_mismatch_is_error() {
    #[derive(Debug, Deserialize)]
    struct Wrong {
        #[allow(dead_code)]
        missing_column: String,
    }

    let source: DuckDbSource<Wrong> = DuckDbSource::open_in_memory("people").unwrap();
    assert_eq!(source.table(), "people");
    source
        .execute_batch("CREATE TABLE people AS SELECT 1 AS id;")
        .unwrap();

    let err = source
        .fetch(&FetchDescriptor::new(), 0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::Decode { .. }));
}

#[tokio::test]
async fn test_duckdb_missing_table_is_error() {
    let source: DuckDbSource<Person> = DuckDbSource::open_in_memory("nope").unwrap();
    let err = source.count(&FetchDescriptor::new()).await.unwrap_err();
    assert!(err.is_fetch_failure());
}

#[test]
fn test_duckdb_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.duckdb");
    let result = DuckDbSource::<Person>::open(&path, "people");
    assert!(matches!(result, Err(crate::Error::FileNotFound { .. })));
}

#[tokio::test]
async fn test_duckdb_temporal_columns_respect_units() {
    let source: DuckDbSource<serde_json::Value> =
        DuckDbSource::open_in_memory("events").unwrap();
    source
        .execute_batch(
            "CREATE TABLE events (
                tm TIME,
                ts_s TIMESTAMP_S,
                ts_ms TIMESTAMP_MS,
                ts TIMESTAMP,
                ts_ns TIMESTAMP_NS,
                day DATE
             );
             INSERT INTO events VALUES (
                '12:34:56.25',
                '2024-01-02 03:04:05',
                '2024-01-02 03:04:05.123',
                '2024-01-02 03:04:05.123456',
                '2024-01-02 03:04:05.123456789',
                '2024-01-02'
             );",
        )
        .unwrap();

    let rows = source.fetch(&FetchDescriptor::new(), 0, 1).await.unwrap();
    assert_eq!(
        rows,
        vec![json!({
            "tm": "12:34:56.250000",
            "ts_s": "2024-01-02T03:04:05.000000Z",
            "ts_ms": "2024-01-02T03:04:05.123000Z",
            "ts": "2024-01-02T03:04:05.123456Z",
            "ts_ns": "2024-01-02T03:04:05.123456Z",
            "day": "2024-01-02"
        })]
    );
}
