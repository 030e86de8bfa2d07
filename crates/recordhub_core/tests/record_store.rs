use recordhub_core::db::{open_db, open_db_in_memory};
use recordhub_core::{NewRecord, Record, RecordStore, SqliteRecordStore, StoreError};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn put_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let record = Record::create(NewRecord::new("groceries", "eggs, milk")).unwrap();
    store.put_record(&record).unwrap();

    let loaded = store.get_record(record.id).unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn put_is_an_upsert_by_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut record = Record::create(NewRecord::new("draft", "v1")).unwrap();
    store.put_record(&record).unwrap();

    record.content = "v2".to_string();
    record.processed = true;
    store.put_record(&record).unwrap();

    let all = store.list_records().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content, "v2");
    assert!(all[0].processed);
}

#[test]
fn get_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    assert!(store.get_record(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn list_on_empty_store_is_empty_vec() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    assert!(store.list_records().unwrap().is_empty());
}

#[test]
fn list_returns_every_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for index in 0..3 {
        let record =
            Record::create(NewRecord::new(format!("title {index}"), "body")).unwrap();
        store.put_record(&record).unwrap();
        ids.push(record.id);
    }

    let mut listed: Vec<Uuid> = store
        .list_records()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    listed.sort();
    ids.sort();
    assert_eq!(listed, ids);
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    let record = Record::create(NewRecord::new("durable", "yes")).unwrap();
    {
        let conn = open_db(&path).unwrap();
        SqliteRecordStore::try_new(&conn)
            .unwrap()
            .put_record(&record)
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    assert_eq!(store.get_record(record.id).unwrap(), Some(record));
}

#[test]
fn undecodable_row_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (id, title, content, created_at, processed)
         VALUES ('not-a-uuid', 't', 'c', '2024-01-01T00:00:00.000Z', 0);",
        [],
    )
    .unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let err = store.list_records().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(SqliteRecordStore::try_new(&conn).is_err());
}
