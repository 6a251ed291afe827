//! redb-based storage layer for the club engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `members` .. `audit_log` | `id` | JSON entity | Entity records |
//! | `settings` | `"club"` | `ClubSettings` | Singleton club settings |
//! | `reservations_by_aircraft` | `(aircraft_id, start, id)` | `()` | Aircraft overlap scans |
//! | `reservations_by_member` | `(member_id, start, id)` | `()` | Member policy scans |
//! | `flight_log_by_reservation` | `reservation_id` | `flight_log_id` | 1:1 lookup |
//! | `flight_logs_by_aircraft` | `(aircraft_id, id)` | `()` | Squawk listing |
//! | `open_flights` | `aircraft_id` | `reservation_id` | At most one open flight per aircraft |
//! | `schedules_by_aircraft` | `(aircraft_id, id)` | `()` | Maintenance status |
//! | `maintenance_logs_by_aircraft` | `(aircraft_id, id)` | `()` | Maintenance history |
//! | `invoices_by_member` | `(member_id, id)` | `()` | Member statement |
//! | `dues_runs` | `(member_id, "YYYY-MM")` | `invoice_id` | Dues idempotency |
//!
//! # Consistency
//!
//! redb admits a single write transaction at a time. Every engine operation
//! reads and writes inside one write transaction, so operations are
//! serializable and a dropped transaction leaves no partial writes.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    Aircraft, AuditEntry, ClubSettings, FlightLog, Invoice, MaintenanceLog, MaintenanceSchedule,
    Member, MembershipTier, Reservation,
};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

type EntityTable = TableDefinition<'static, i64, &'static [u8]>;
type TripleIndex = TableDefinition<'static, (i64, i64, i64), ()>;
type PairIndex = TableDefinition<'static, (i64, i64), ()>;

const MEMBERS_TABLE: EntityTable = TableDefinition::new("members");
const TIERS_TABLE: EntityTable = TableDefinition::new("membership_tiers");
const AIRCRAFT_TABLE: EntityTable = TableDefinition::new("aircraft");
const RESERVATIONS_TABLE: EntityTable = TableDefinition::new("reservations");
const FLIGHT_LOGS_TABLE: EntityTable = TableDefinition::new("flight_logs");
const SCHEDULES_TABLE: EntityTable = TableDefinition::new("maintenance_schedules");
const MAINTENANCE_LOGS_TABLE: EntityTable = TableDefinition::new("maintenance_logs");
const INVOICES_TABLE: EntityTable = TableDefinition::new("invoices");
const AUDIT_TABLE: EntityTable = TableDefinition::new("audit_log");

const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");
const SETTINGS_KEY: &str = "club";

const RESERVATIONS_BY_AIRCRAFT: TripleIndex = TableDefinition::new("reservations_by_aircraft");
const RESERVATIONS_BY_MEMBER: TripleIndex = TableDefinition::new("reservations_by_member");
const FLIGHT_LOG_BY_RESERVATION: TableDefinition<i64, i64> =
    TableDefinition::new("flight_log_by_reservation");
const FLIGHT_LOGS_BY_AIRCRAFT: PairIndex = TableDefinition::new("flight_logs_by_aircraft");
const OPEN_FLIGHTS_TABLE: TableDefinition<i64, i64> = TableDefinition::new("open_flights");
const SCHEDULES_BY_AIRCRAFT: PairIndex = TableDefinition::new("schedules_by_aircraft");
const MAINTENANCE_LOGS_BY_AIRCRAFT: PairIndex =
    TableDefinition::new("maintenance_logs_by_aircraft");
const INVOICES_BY_MEMBER: PairIndex = TableDefinition::new("invoices_by_member");
const DUES_RUNS_TABLE: TableDefinition<(i64, &str), i64> = TableDefinition::new("dues_runs");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A record stored as JSON under its snowflake id
pub trait Entity: Serialize + DeserializeOwned {
    const TABLE: EntityTable;
    /// Name used in not-found errors
    const NAME: &'static str;
    fn id(&self) -> i64;
}

macro_rules! impl_entity {
    ($($ty:ident => $table:ident),* $(,)?) => {
        $(impl Entity for $ty {
            const TABLE: EntityTable = $table;
            const NAME: &'static str = stringify!($ty);
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

impl_entity! {
    Member => MEMBERS_TABLE,
    MembershipTier => TIERS_TABLE,
    Aircraft => AIRCRAFT_TABLE,
    Reservation => RESERVATIONS_TABLE,
    FlightLog => FLIGHT_LOGS_TABLE,
    MaintenanceSchedule => SCHEDULES_TABLE,
    MaintenanceLog => MAINTENANCE_LOGS_TABLE,
    Invoice => INVOICES_TABLE,
    AuditEntry => AUDIT_TABLE,
}

fn load<T: Entity>(
    table: &impl ReadableTable<i64, &'static [u8]>,
    id: i64,
) -> StorageResult<Option<T>> {
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn load_all<T: Entity>(table: &impl ReadableTable<i64, &'static [u8]>) -> StorageResult<Vec<T>> {
    let mut items = Vec::new();
    for entry in table.iter()? {
        let (_key, value) = entry?;
        items.push(serde_json::from_slice(value.value())?);
    }
    Ok(items)
}

/// Follow a `(owner, start, id)` index range into the entity table
fn load_by_triple<T: Entity>(
    index: &impl ReadableTable<(i64, i64, i64), ()>,
    entities: &impl ReadableTable<i64, &'static [u8]>,
    range: Range<(i64, i64, i64)>,
) -> StorageResult<Vec<T>> {
    let mut items = Vec::new();
    for entry in index.range(range)? {
        let (key, _) = entry?;
        let (_, _, id) = key.value();
        if let Some(item) = load(entities, id)? {
            items.push(item);
        }
    }
    Ok(items)
}

/// Follow an `(owner, id)` index into the entity table
fn load_by_pair<T: Entity>(
    index: &impl ReadableTable<(i64, i64), ()>,
    entities: &impl ReadableTable<i64, &'static [u8]>,
    owner: i64,
) -> StorageResult<Vec<T>> {
    let mut items = Vec::new();
    for entry in index.range((owner, i64::MIN)..=(owner, i64::MAX))? {
        let (key, _) = entry?;
        let (_, id) = key.value();
        if let Some(item) = load(entities, id)? {
            items.push(item);
        }
    }
    Ok(items)
}

fn owner_range(owner: i64) -> Range<(i64, i64, i64)> {
    (owner, i64::MIN, i64::MIN)..(owner, i64::MAX, i64::MAX)
}

/// Club storage backed by redb
#[derive(Clone)]
pub struct ClubStorage {
    db: Arc<Database>,
}

impl ClubStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits are durable once `commit()` returns (copy-on-write with
    /// an atomic root swap), so a crash never leaves a half-applied checkout.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for table in [
                MEMBERS_TABLE,
                TIERS_TABLE,
                AIRCRAFT_TABLE,
                RESERVATIONS_TABLE,
                FLIGHT_LOGS_TABLE,
                SCHEDULES_TABLE,
                MAINTENANCE_LOGS_TABLE,
                INVOICES_TABLE,
                AUDIT_TABLE,
            ] {
                let _ = write_txn.open_table(table)?;
            }
            for index in [RESERVATIONS_BY_AIRCRAFT, RESERVATIONS_BY_MEMBER] {
                let _ = write_txn.open_table(index)?;
            }
            for index in [
                FLIGHT_LOGS_BY_AIRCRAFT,
                SCHEDULES_BY_AIRCRAFT,
                MAINTENANCE_LOGS_BY_AIRCRAFT,
                INVOICES_BY_MEMBER,
            ] {
                let _ = write_txn.open_table(index)?;
            }
            let _ = write_txn.open_table(SETTINGS_TABLE)?;
            let _ = write_txn.open_table(FLIGHT_LOG_BY_RESERVATION)?;
            let _ = write_txn.open_table(OPEN_FLIGHTS_TABLE)?;
            let _ = write_txn.open_table(DUES_RUNS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic entity access (inside a write transaction) ==========

    pub fn get<T: Entity>(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<T>> {
        let table = txn.open_table(T::TABLE)?;
        load(&table, id)
    }

    pub fn all<T: Entity>(&self, txn: &WriteTransaction) -> StorageResult<Vec<T>> {
        let table = txn.open_table(T::TABLE)?;
        load_all(&table)
    }

    /// Insert or overwrite by id. Index keys are immutable fields, so
    /// updates never touch the indices.
    pub fn put<T: Entity>(&self, txn: &WriteTransaction, item: &T) -> StorageResult<()> {
        let mut table = txn.open_table(T::TABLE)?;
        let value = serde_json::to_vec(item)?;
        table.insert(item.id(), value.as_slice())?;
        Ok(())
    }

    pub fn delete<T: Entity>(&self, txn: &WriteTransaction, id: i64) -> StorageResult<bool> {
        let mut table = txn.open_table(T::TABLE)?;
        Ok(table.remove(id)?.is_some())
    }

    // ========== Generic entity access (snapshot reads) ==========

    pub fn read<T: Entity>(&self, id: i64) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;
        load(&table, id)
    }

    pub fn read_all<T: Entity>(&self) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;
        load_all(&table)
    }

    // ========== Settings ==========

    pub fn get_settings(&self, txn: &WriteTransaction) -> StorageResult<Option<ClubSettings>> {
        let table = txn.open_table(SETTINGS_TABLE)?;
        match table.get(SETTINGS_KEY)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn read_settings(&self) -> StorageResult<Option<ClubSettings>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        match table.get(SETTINGS_KEY)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_settings(&self, txn: &WriteTransaction, settings: &ClubSettings) -> StorageResult<()> {
        let mut table = txn.open_table(SETTINGS_TABLE)?;
        let value = serde_json::to_vec(settings)?;
        table.insert(SETTINGS_KEY, value.as_slice())?;
        Ok(())
    }

    // ========== Reservations ==========

    /// Store a new reservation and index it by aircraft and by member
    pub fn insert_reservation(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<()> {
        self.put(txn, reservation)?;
        {
            let mut by_aircraft = txn.open_table(RESERVATIONS_BY_AIRCRAFT)?;
            by_aircraft.insert(
                (reservation.aircraft_id, reservation.start_time, reservation.id),
                (),
            )?;
        }
        let mut by_member = txn.open_table(RESERVATIONS_BY_MEMBER)?;
        by_member.insert(
            (reservation.member_id, reservation.start_time, reservation.id),
            (),
        )?;
        Ok(())
    }

    /// Reservations on an aircraft that start before `before`, oldest first.
    ///
    /// Any reservation overlapping `[start, end)` starts before `end`, so
    /// callers pass the candidate end time and filter on `end_time`.
    pub fn aircraft_reservations_starting_before(
        &self,
        txn: &WriteTransaction,
        aircraft_id: i64,
        before: i64,
    ) -> StorageResult<Vec<Reservation>> {
        let index = txn.open_table(RESERVATIONS_BY_AIRCRAFT)?;
        let entities = txn.open_table(RESERVATIONS_TABLE)?;
        load_by_triple(
            &index,
            &entities,
            (aircraft_id, i64::MIN, i64::MIN)..(aircraft_id, before, i64::MIN),
        )
    }

    pub fn member_reservations(
        &self,
        txn: &WriteTransaction,
        member_id: i64,
    ) -> StorageResult<Vec<Reservation>> {
        let index = txn.open_table(RESERVATIONS_BY_MEMBER)?;
        let entities = txn.open_table(RESERVATIONS_TABLE)?;
        load_by_triple(&index, &entities, owner_range(member_id))
    }

    pub fn read_member_reservations(&self, member_id: i64) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RESERVATIONS_BY_MEMBER)?;
        let entities = read_txn.open_table(RESERVATIONS_TABLE)?;
        load_by_triple(&index, &entities, owner_range(member_id))
    }

    pub fn read_aircraft_reservations(&self, aircraft_id: i64) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RESERVATIONS_BY_AIRCRAFT)?;
        let entities = read_txn.open_table(RESERVATIONS_TABLE)?;
        load_by_triple(&index, &entities, owner_range(aircraft_id))
    }

    // ========== Flight logs ==========

    pub fn insert_flight_log(&self, txn: &WriteTransaction, log: &FlightLog) -> StorageResult<()> {
        self.put(txn, log)?;
        {
            let mut by_reservation = txn.open_table(FLIGHT_LOG_BY_RESERVATION)?;
            by_reservation.insert(log.reservation_id, log.id)?;
        }
        let mut by_aircraft = txn.open_table(FLIGHT_LOGS_BY_AIRCRAFT)?;
        by_aircraft.insert((log.aircraft_id, log.id), ())?;
        Ok(())
    }

    pub fn flight_log_for_reservation(
        &self,
        txn: &WriteTransaction,
        reservation_id: i64,
    ) -> StorageResult<Option<FlightLog>> {
        let log_id = {
            let index = txn.open_table(FLIGHT_LOG_BY_RESERVATION)?;
            index.get(reservation_id)?.map(|guard| guard.value())
        };
        match log_id {
            Some(id) => self.get(txn, id),
            None => Ok(None),
        }
    }

    pub fn read_flight_logs_for_aircraft(&self, aircraft_id: i64) -> StorageResult<Vec<FlightLog>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(FLIGHT_LOGS_BY_AIRCRAFT)?;
        let entities = read_txn.open_table(FLIGHT_LOGS_TABLE)?;
        load_by_pair(&index, &entities, aircraft_id)
    }

    // ========== Open flights (aircraft → checked-out reservation) ==========

    pub fn open_flight(&self, txn: &WriteTransaction, aircraft_id: i64) -> StorageResult<Option<i64>> {
        let table = txn.open_table(OPEN_FLIGHTS_TABLE)?;
        Ok(table.get(aircraft_id)?.map(|guard| guard.value()))
    }

    pub fn set_open_flight(
        &self,
        txn: &WriteTransaction,
        aircraft_id: i64,
        reservation_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_FLIGHTS_TABLE)?;
        table.insert(aircraft_id, reservation_id)?;
        Ok(())
    }

    pub fn clear_open_flight(&self, txn: &WriteTransaction, aircraft_id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_FLIGHTS_TABLE)?;
        table.remove(aircraft_id)?;
        Ok(())
    }

    // ========== Maintenance ==========

    pub fn insert_schedule(
        &self,
        txn: &WriteTransaction,
        schedule: &MaintenanceSchedule,
    ) -> StorageResult<()> {
        self.put(txn, schedule)?;
        let mut index = txn.open_table(SCHEDULES_BY_AIRCRAFT)?;
        index.insert((schedule.aircraft_id, schedule.id), ())?;
        Ok(())
    }

    pub fn remove_schedule(
        &self,
        txn: &WriteTransaction,
        schedule: &MaintenanceSchedule,
    ) -> StorageResult<()> {
        self.delete::<MaintenanceSchedule>(txn, schedule.id)?;
        let mut index = txn.open_table(SCHEDULES_BY_AIRCRAFT)?;
        index.remove((schedule.aircraft_id, schedule.id))?;
        Ok(())
    }

    pub fn read_schedules_for_aircraft(
        &self,
        aircraft_id: i64,
    ) -> StorageResult<Vec<MaintenanceSchedule>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(SCHEDULES_BY_AIRCRAFT)?;
        let entities = read_txn.open_table(SCHEDULES_TABLE)?;
        load_by_pair(&index, &entities, aircraft_id)
    }

    pub fn insert_maintenance_log(
        &self,
        txn: &WriteTransaction,
        log: &MaintenanceLog,
    ) -> StorageResult<()> {
        self.put(txn, log)?;
        let mut index = txn.open_table(MAINTENANCE_LOGS_BY_AIRCRAFT)?;
        index.insert((log.aircraft_id, log.id), ())?;
        Ok(())
    }

    pub fn read_maintenance_logs(&self, aircraft_id: i64) -> StorageResult<Vec<MaintenanceLog>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(MAINTENANCE_LOGS_BY_AIRCRAFT)?;
        let entities = read_txn.open_table(MAINTENANCE_LOGS_TABLE)?;
        load_by_pair(&index, &entities, aircraft_id)
    }

    // ========== Invoices ==========

    pub fn insert_invoice(&self, txn: &WriteTransaction, invoice: &Invoice) -> StorageResult<()> {
        self.put(txn, invoice)?;
        let mut index = txn.open_table(INVOICES_BY_MEMBER)?;
        index.insert((invoice.member_id, invoice.id), ())?;
        Ok(())
    }

    pub fn read_member_invoices(&self, member_id: i64) -> StorageResult<Vec<Invoice>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(INVOICES_BY_MEMBER)?;
        let entities = read_txn.open_table(INVOICES_TABLE)?;
        load_by_pair(&index, &entities, member_id)
    }

    /// Dues invoice already issued to a member for a billing period
    pub fn dues_invoice(
        &self,
        txn: &WriteTransaction,
        member_id: i64,
        period: &str,
    ) -> StorageResult<Option<i64>> {
        let table = txn.open_table(DUES_RUNS_TABLE)?;
        Ok(table.get((member_id, period))?.map(|guard| guard.value()))
    }

    pub fn record_dues_invoice(
        &self,
        txn: &WriteTransaction,
        member_id: i64,
        period: &str,
        invoice_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(DUES_RUNS_TABLE)?;
        table.insert((member_id, period), invoice_id)?;
        Ok(())
    }
}
