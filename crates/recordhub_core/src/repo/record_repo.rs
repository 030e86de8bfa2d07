//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert, point lookup, and full scan over `records`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `put_record` is idempotent for the same record.
//! - `list_records` never returns an absent value; an empty store is `vec![]`.

use crate::db::DbError;
use crate::model::record::{rfc3339_millis, Record, RecordId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    processed
FROM records";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reaching or decoding the record store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value store for records.
pub trait RecordStore {
    /// Inserts or replaces the record stored under `record.id`.
    fn put_record(&self, record: &Record) -> StoreResult<()>;
    /// Point lookup; `None` when no record has this id.
    fn get_record(&self, id: RecordId) -> StoreResult<Option<Record>>;
    /// Full scan of every stored record.
    fn list_records(&self) -> StoreResult<Vec<Record>>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn put_record(&self, record: &Record) -> StoreResult<()> {
        (**self).put_record(record)
    }

    fn get_record(&self, id: RecordId) -> StoreResult<Option<Record>> {
        (**self).get_record(id)
    }

    fn list_records(&self) -> StoreResult<Vec<Record>> {
        (**self).list_records()
    }
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a store after checking the `records` table is present.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let ready: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'records'
            );",
            [],
            |row| row.get(0),
        )?;
        if ready != 1 {
            return Err(StoreError::InvalidData(
                "records table is missing; open the connection with open_db".to_string(),
            ));
        }
        Ok(Self::new(conn))
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn put_record(&self, record: &Record) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO records (id, title, content, created_at, processed)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                created_at = excluded.created_at,
                processed = excluded.processed;",
            params![
                record.id.to_string(),
                record.title.as_str(),
                record.content.as_str(),
                record.created_at_text(),
                bool_to_int(record.processed),
            ],
        )?;
        Ok(())
    }

    fn get_record(&self, id: RecordId) -> StoreResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_records(&self) -> StoreResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|err| StoreError::InvalidData(format!("invalid id `{id_text}`: {err}")))?;
    let created_at_text: String = row.get("created_at")?;
    let created_at = rfc3339_millis::parse(&created_at_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid created_at `{created_at_text}`: {err}"))
    })?;
    let processed = match row.get::<_, i64>("processed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid processed flag `{other}`"
            )))
        }
    };

    Ok(Record::with_parts(
        id,
        row.get::<_, String>("title")?,
        row.get::<_, String>("content")?,
        created_at,
        processed,
    ))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
