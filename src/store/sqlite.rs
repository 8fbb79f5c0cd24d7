//! SQLite-backed appointment store.
//!
//! One table, one row per appointment. Timestamps are stored as
//! `YYYY-MM-DD HH:MM:SS` text so the file stays readable with the
//! `sqlite3` shell. Rows are read back in insertion order.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, TransactionBehavior};
use tracing::{debug, info};

use super::{AppointmentStore, StoreError, StoreResult};
use crate::models::{Appointment, AppointmentId};

const STORED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS appointments (
        id              TEXT PRIMARY KEY,
        patient_name    TEXT NOT NULL,
        patient_contact TEXT NOT NULL,
        provider        TEXT NOT NULL,
        duration        INTEGER NOT NULL,
        time            TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_appointments_provider_time
        ON appointments (provider, time);
";

/// Appointment store over a single SQLite connection.
///
/// The connection is owned by the store and released by
/// [`AppointmentStore::close`] (or on drop).
#[derive(Debug)]
pub struct SqliteStore {
    conn: Option<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path` and initializes the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened appointment database");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let mut store = Self { conn: Some(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("database connection is closed".to_string()))
    }

    fn conn_mut(&mut self) -> StoreResult<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| StoreError::Unavailable("database connection is closed".to_string()))
    }
}

impl AppointmentStore for SqliteStore {
    fn initialize_schema(&mut self) -> StoreResult<()> {
        self.conn()?.execute_batch(CREATE_SCHEMA)?;
        Ok(())
    }

    fn insert(&mut self, appointment: &Appointment) -> StoreResult<()> {
        insert_row(self.conn()?, appointment)
    }

    fn fetch_all(&self) -> StoreResult<Vec<Appointment>> {
        let rows = select_all(self.conn()?)?;
        debug!(count = rows.len(), "fetched appointments");
        Ok(rows)
    }

    fn delete(&mut self, id: AppointmentId) -> StoreResult<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM appointments WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    /// Runs the check and the insert inside one `IMMEDIATE` transaction, so
    /// a second process writing to the same file waits instead of racing.
    fn insert_unless(
        &mut self,
        appointment: &Appointment,
        blocker: &dyn Fn(&[Appointment]) -> Option<Appointment>,
    ) -> StoreResult<Option<Appointment>> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = select_all(&tx)?;
        if let Some(blocking) = blocker(existing.as_slice()) {
            tx.rollback()?;
            return Ok(Some(blocking));
        }

        insert_row(&tx, appointment)?;
        tx.commit()?;
        Ok(None)
    }

    fn close(&mut self) -> StoreResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
            info!("closed appointment database");
        }
        Ok(())
    }
}

fn insert_row(conn: &Connection, appointment: &Appointment) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO appointments (id, patient_name, patient_contact, provider, duration, time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            appointment.id().to_string(),
            appointment.patient_name(),
            appointment.patient_contact(),
            appointment.provider(),
            appointment.duration_minutes(),
            appointment.start().format(STORED_TIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Columns exactly as stored, before decoding.
struct StoredRow {
    id: String,
    patient_name: String,
    patient_contact: String,
    provider: String,
    duration: i64,
    time: String,
}

impl StoredRow {
    fn decode(self) -> StoreResult<Appointment> {
        let id = AppointmentId::parse(&self.id).map_err(|_| StoreError::Corrupt {
            field: "id",
            value: self.id.clone(),
        })?;
        let start = NaiveDateTime::parse_from_str(&self.time, STORED_TIME_FORMAT).map_err(|_| {
            StoreError::Corrupt {
                field: "time",
                value: self.time.clone(),
            }
        })?;
        let appointment = Appointment::new(
            self.patient_name,
            self.patient_contact,
            self.provider,
            start,
            self.duration,
        )
        .map_err(|_| StoreError::Corrupt {
            field: "duration",
            value: self.duration.to_string(),
        })?;
        Ok(appointment.with_id(id))
    }
}

fn select_all(conn: &Connection) -> StoreResult<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_name, patient_contact, provider, duration, time
         FROM appointments ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredRow {
            id: row.get(0)?,
            patient_name: row.get(1)?,
            patient_contact: row.get(2)?,
            provider: row.get(3)?,
            duration: row.get(4)?,
            time: row.get(5)?,
        })
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.decode()?);
    }
    Ok(appointments)
}
