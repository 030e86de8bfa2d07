mod common;

use common::{FailingStore, RecordingSink};
use recordhub_core::db::open_db_in_memory;
use recordhub_core::{
    dispatch, dispatch_invocation, ErrorKind, EventSinks, Invocation, NewRecord, OperationOutput,
    RecordService, ServiceError, SinkKind, SqliteRecordStore, ValidationReason,
};
use serde_json::{json, Value};

#[test]
fn unknown_operation_names_the_operation() {
    let store = FailingStore::default();
    let service = RecordService::new(&store);

    let err = dispatch(&service, "frobnicate", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    assert!(matches!(&err, ServiceError::UnknownOperation(name) if name == "frobnicate"));
    assert_eq!(err.to_response().operation.as_deref(), Some("frobnicate"));
    assert_eq!(store.calls(), 0);
}

#[test]
fn create_then_get_through_router() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteRecordStore::try_new(&conn).unwrap());

    let created = match dispatch(
        &service,
        "createRecord",
        &json!({ "title": "hello", "content": "world" }),
    )
    .unwrap()
    {
        OperationOutput::Record(record) => record,
        other => panic!("unexpected output: {other:?}"),
    };

    let fetched = dispatch(
        &service,
        "getRecord",
        &json!({ "id": created.id.to_string() }),
    )
    .unwrap();
    assert_eq!(fetched, OperationOutput::MaybeRecord(Some(created.clone())));

    let listed = dispatch(&service, "listRecords", &json!({})).unwrap();
    assert_eq!(listed, OperationOutput::Records(vec![created]));
}

#[test]
fn create_with_missing_field_never_reaches_store_or_sinks() {
    let store = FailingStore::default();
    let queue = RecordingSink::ok(SinkKind::Queue);
    let service = RecordService::with_sinks(&store, EventSinks::none().with_queue(queue.clone()));

    let err = dispatch(&service, "createRecord", &json!({ "title": "only title" })).unwrap_err();
    match err {
        ServiceError::Validation(validation) => {
            assert_eq!(validation.field, "content");
            assert_eq!(validation.reason, ValidationReason::Missing);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.calls(), 0);
    assert_eq!(queue.calls(), 0);
}

#[test]
fn get_with_never_issued_id_is_absent_without_store_call() {
    let store = FailingStore::default();
    let service = RecordService::new(&store);

    let output = dispatch(&service, "getRecord", &json!({ "id": "never-created" })).unwrap();
    assert_eq!(output, OperationOutput::MaybeRecord(None));
    assert_eq!(output.to_json().unwrap(), Value::Null);
    assert_eq!(store.calls(), 0);

    let err = dispatch(&service, "getRecord", &json!({ "id": " " })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    let err = dispatch(&service, "getRecord", &json!({ "id": 42 })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert_eq!(store.calls(), 0);
}

#[test]
fn get_matches_only_the_exact_stored_id_text() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteRecordStore::try_new(&conn).unwrap());
    let created = service
        .create_record(NewRecord::new("keyed", "exactly"))
        .unwrap();

    let canonical = created.id.to_string();
    let found = dispatch(&service, "getRecord", &json!({ "id": canonical })).unwrap();
    assert_eq!(found, OperationOutput::MaybeRecord(Some(created.clone())));

    for other_form in [
        format!("{{{canonical}}}"),
        created.id.simple().to_string(),
        canonical.to_uppercase(),
    ] {
        let output = dispatch(&service, "getRecord", &json!({ "id": other_form })).unwrap();
        assert_eq!(output, OperationOutput::MaybeRecord(None), "{other_form}");
    }
}

#[test]
fn absent_and_empty_results_serialize_as_null_and_empty_array() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteRecordStore::try_new(&conn).unwrap());

    let missing = dispatch(
        &service,
        "getRecord",
        &json!({ "id": "7f9c24e5-2f4b-4b8e-9a6e-0c1d2e3f4a5b" }),
    )
    .unwrap();
    assert_eq!(missing.to_json().unwrap(), Value::Null);

    let empty = dispatch(&service, "listRecords", &json!({})).unwrap();
    assert_eq!(empty.to_json().unwrap(), json!([]));
}

#[test]
fn resolver_event_is_dispatched() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteRecordStore::try_new(&conn).unwrap());

    let event = json!({
        "info": { "fieldName": "createRecord" },
        "arguments": { "title": "from event", "content": "body" }
    });
    let output = dispatch_invocation(&service, &Invocation::from_event(&event)).unwrap();
    let value = output.to_json().unwrap();
    assert_eq!(value["title"], "from event");
    assert_eq!(value["processed"], false);
}

#[test]
fn store_write_failure_surfaces_with_record_id() {
    let store = FailingStore::default();
    let service = RecordService::new(&store);

    let err = dispatch(
        &service,
        "createRecord",
        &json!({ "title": "t", "content": "c" }),
    )
    .unwrap_err();
    let response = err.to_response();
    assert_eq!(response.error_type, "StoreWriteFailed");
    assert!(response.record_id.is_some());
}
