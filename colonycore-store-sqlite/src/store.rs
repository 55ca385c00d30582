// colonycore-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Store
// Description: SQL-backed PersistentStore adapter, one table per entity.
// Purpose: Load a Snapshot from SQLite, hand it to the shared Transaction
// algorithm, and persist the resulting change journal back inside a native
// SQLite transaction.
// Dependencies: colonycore-core, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each entity kind lives in its own table (`facilities`, `housing_units`,
//! `organisms`, ...) with typed `id`/`created_at`/`updated_at` columns plus a
//! single `data` column holding that row's remaining fields as the same
//! stable JSON shape [`colonycore_core::EntityCodec`] already produces for
//! the wire. Scalar fields, list-of-id fields, and extension containers all
//! flow through that one codec; a literal typed-column-per-field schema
//! would still need a JSON escape hatch for plugin-defined extension
//! payloads (whose shape isn't fixed at compile time), so this adapter uses
//! JSON consistently for anything past the common identity columns. See
//! `DESIGN.md` for the full rationale.
//!
//! [`SqliteStore::run_in_transaction`] loads a full [`colonycore_core::Snapshot`],
//! runs the caller's closure, evaluates the shared rule registry, and -- if
//! nothing blocks -- replays the transaction's change journal against the
//! backing tables inside one native `BEGIN`/`COMMIT`. `View` loads a fresh
//! snapshot under the same connection mutex and never observes a partially
//! applied write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use colonycore_core::Action;
use colonycore_core::AnyEntity;
use colonycore_core::BreedingUnit;
use colonycore_core::ChangeRecord;
use colonycore_core::Cohort;
use colonycore_core::EntityCodec;
use colonycore_core::EntityKind;
use colonycore_core::Facility;
use colonycore_core::GenotypeMarker;
use colonycore_core::HousingUnit;
use colonycore_core::Line;
use colonycore_core::Observation;
use colonycore_core::Organism;
use colonycore_core::Permit;
use colonycore_core::PersistentStore;
use colonycore_core::Procedure;
use colonycore_core::Project;
use colonycore_core::Protocol;
use colonycore_core::RuleRegistry;
use colonycore_core::Sample;
use colonycore_core::Snapshot;
use colonycore_core::StoreError;
use colonycore_core::Strain;
use colonycore_core::SupplyItem;
use colonycore_core::Transaction;
use colonycore_core::Treatment;
use colonycore_core::TransactionView;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms) applied to the backing connection.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Table names, in declaration order.
const TABLE_NAMES: [&str; 16] = [
    "facilities",
    "housing_units",
    "organisms",
    "cohorts",
    "breeding_units",
    "procedures",
    "treatments",
    "observations",
    "samples",
    "protocols",
    "permits",
    "projects",
    "supply_items",
    "lines",
    "strains",
    "genotype_markers",
];

/// Maps an entity kind to its table name.
const fn table_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Facility => "facilities",
        EntityKind::HousingUnit => "housing_units",
        EntityKind::Organism => "organisms",
        EntityKind::Cohort => "cohorts",
        EntityKind::BreedingUnit => "breeding_units",
        EntityKind::Procedure => "procedures",
        EntityKind::Treatment => "treatments",
        EntityKind::Observation => "observations",
        EntityKind::Sample => "samples",
        EntityKind::Protocol => "protocols",
        EntityKind::Permit => "permits",
        EntityKind::Project => "projects",
        EntityKind::SupplyItem => "supply_items",
        EntityKind::Line => "lines",
        EntityKind::Strain => "strains",
        EntityKind::GenotypeMarker => "genotype_markers",
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS, journal_mode: SqliteJournalMode::default(), sync_mode: SqliteSyncMode::default() }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the `SQLite` store adapter.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The `SQLite` engine reported an error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row's JSON payload failed to decode.
    #[error("sqlite store corrupt row in {table}: {message}")]
    Corrupt {
        /// Table the corrupt row was read from.
        table: &'static str,
        /// Description of the decode failure.
        message: String,
    },
    /// The store's internal connection mutex was poisoned.
    #[error("sqlite store connection lock poisoned")]
    Poisoned,
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Opens a connection with the configured pragmas applied.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Opens an in-memory connection, used by tests that don't need a path on
/// disk.
fn open_memory_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let connection = Connection::open_in_memory()?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies durability and concurrency pragmas.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection.execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Creates every entity table if absent.
fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    for table in TABLE_NAMES {
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                data TEXT NOT NULL
            );"
        ))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Row <-> Entity Glue
// ============================================================================

/// Encodes an [`AnyEntity`] to its wire-form JSON.
fn encode_any(entity: &AnyEntity) -> serde_json::Value {
    match entity {
        AnyEntity::Facility(entity) => entity.encode(),
        AnyEntity::HousingUnit(entity) => entity.encode(),
        AnyEntity::Organism(entity) => entity.encode(),
        AnyEntity::Cohort(entity) => entity.encode(),
        AnyEntity::BreedingUnit(entity) => entity.encode(),
        AnyEntity::Procedure(entity) => entity.encode(),
        AnyEntity::Treatment(entity) => entity.encode(),
        AnyEntity::Observation(entity) => entity.encode(),
        AnyEntity::Sample(entity) => entity.encode(),
        AnyEntity::Protocol(entity) => entity.encode(),
        AnyEntity::Permit(entity) => entity.encode(),
        AnyEntity::Project(entity) => entity.encode(),
        AnyEntity::SupplyItem(entity) => entity.encode(),
        AnyEntity::Line(entity) => entity.encode(),
        AnyEntity::Strain(entity) => entity.encode(),
        AnyEntity::GenotypeMarker(entity) => entity.encode(),
    }
}

/// Upserts one row for `entity` into its table.
fn upsert_row(connection: &Connection, entity: &AnyEntity) -> Result<(), SqliteStoreError> {
    let table = table_name(entity.kind());
    let base = entity.base();
    let data = serde_json::to_string(&encode_any(entity)).map_err(|error| SqliteStoreError::Corrupt { table, message: error.to_string() })?;
    connection.execute(
        &format!(
            "INSERT INTO {table} (id, created_at, updated_at, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE SET created_at = excluded.created_at, updated_at = excluded.updated_at, data = excluded.data;"
        ),
        params![base.id, base.created_at.to_string(), base.updated_at.to_string(), data],
    )?;
    Ok(())
}

/// Deletes the row with `id` from `kind`'s table.
fn delete_row(connection: &Connection, kind: EntityKind, id: &str) -> Result<(), SqliteStoreError> {
    let table = table_name(kind);
    connection.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), params![id])?;
    Ok(())
}

/// Applies one change record to the backing tables.
fn apply_change(connection: &Connection, record: &ChangeRecord) -> Result<(), SqliteStoreError> {
    match record.action {
        Action::Create | Action::Update => {
            let Some(after) = record.after.as_ref() else {
                return Err(SqliteStoreError::Corrupt { table: table_name(record.kind), message: "create/update record missing after value".to_string() });
            };
            upsert_row(connection, after)
        }
        Action::Delete => delete_row(connection, record.kind, &record.id),
    }
}

/// Loads every row of `table` and decodes it with `decode`, inserting into
/// `map` keyed by id.
fn load_table<T>(connection: &Connection, table: &'static str, decode: impl Fn(&serde_json::Value) -> Result<T, colonycore_core::EntityError>) -> Result<std::collections::BTreeMap<String, T>, SqliteStoreError> {
    let mut statement = connection.prepare(&format!("SELECT id, data FROM {table};"))?;
    let rows = statement.query_map(params![], |row| {
        let id: String = row.get(0)?;
        let data: String = row.get(1)?;
        Ok((id, data))
    })?;
    let mut map = std::collections::BTreeMap::new();
    for row in rows {
        let (id, data) = row?;
        let value: serde_json::Value = serde_json::from_str(&data).map_err(|error| SqliteStoreError::Corrupt { table, message: error.to_string() })?;
        let entity = decode(&value).map_err(|error| SqliteStoreError::Corrupt { table, message: error.to_string() })?;
        map.insert(id, entity);
    }
    Ok(map)
}

/// Loads a full [`Snapshot`] from the backing tables.
fn load_snapshot(connection: &Connection) -> Result<Snapshot, SqliteStoreError> {
    Ok(Snapshot {
        facilities: load_table(connection, table_name(EntityKind::Facility), Facility::decode)?,
        housing_units: load_table(connection, table_name(EntityKind::HousingUnit), HousingUnit::decode)?,
        organisms: load_table(connection, table_name(EntityKind::Organism), Organism::decode)?,
        cohorts: load_table(connection, table_name(EntityKind::Cohort), Cohort::decode)?,
        breeding_units: load_table(connection, table_name(EntityKind::BreedingUnit), BreedingUnit::decode)?,
        procedures: load_table(connection, table_name(EntityKind::Procedure), Procedure::decode)?,
        treatments: load_table(connection, table_name(EntityKind::Treatment), Treatment::decode)?,
        observations: load_table(connection, table_name(EntityKind::Observation), Observation::decode)?,
        samples: load_table(connection, table_name(EntityKind::Sample), Sample::decode)?,
        protocols: load_table(connection, table_name(EntityKind::Protocol), Protocol::decode)?,
        permits: load_table(connection, table_name(EntityKind::Permit), Permit::decode)?,
        projects: load_table(connection, table_name(EntityKind::Project), Project::decode)?,
        supply_items: load_table(connection, table_name(EntityKind::SupplyItem), SupplyItem::decode)?,
        lines: load_table(connection, table_name(EntityKind::Line), Line::decode)?,
        strains: load_table(connection, table_name(EntityKind::Strain), Strain::decode)?,
        genotype_markers: load_table(connection, table_name(EntityKind::GenotypeMarker), GenotypeMarker::decode)?,
    })
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// The `SQLite`-backed [`PersistentStore`] adapter.
///
/// # Invariants
/// - All connection access is serialized through a single mutex; `SQLite`'s
///   own transaction semantics provide the native commit/rollback boundary.
pub struct SqliteStore {
    /// The backing connection, serializing all reads and writes.
    connection: Mutex<Connection>,
    /// Rules evaluated against every transaction's working view at commit.
    rules: RuleRegistry,
}

impl SqliteStore {
    /// Opens (creating if absent) a `SQLite` database at `config.path` and
    /// initializes its schema, using the required built-in rules.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        Self::open_with_rules(config, RuleRegistry::with_builtins())
    }

    /// Opens a store with a caller-supplied rule registry (used by the
    /// Plugin Installation Surface to append plugin rules after the
    /// built-ins).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open_with_rules(config: SqliteStoreConfig, rules: RuleRegistry) -> Result<Self, SqliteStoreError> {
        let connection = open_connection(&config)?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection), rules })
    }

    /// Opens an in-memory `SQLite` store, used by tests that want `SQLite`'s
    /// exact statement repertoire without a temp file.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let config = SqliteStoreConfig::new(Path::new(":memory:"));
        let connection = open_memory_connection(&config)?;
        initialize_schema(&connection)?;
        Ok(Self { connection: Mutex::new(connection), rules: RuleRegistry::with_builtins() })
    }
}

impl PersistentStore for SqliteStore {
    fn run_in_transaction<F, R>(&self, body: F) -> Result<(R, colonycore_core::RuleOutcome), StoreError>
    where
        F: FnOnce(&mut Transaction) -> Result<R, StoreError>,
    {
        let mut connection = self.connection.lock().map_err(|_| StoreError::from(SqliteStoreError::Poisoned))?;
        let starting_snapshot = load_snapshot(&connection).map_err(StoreError::from)?;
        let mut transaction = Transaction::new(starting_snapshot);
        let result = body(&mut transaction)?;
        let (working_snapshot, journal) = transaction.into_parts();
        let outcome = self.rules.evaluate_all(&working_snapshot, &journal)?;
        if outcome.has_blocking() {
            return Err(StoreError::RuleViolation(outcome));
        }
        let native_tx = connection.transaction().map_err(|error| StoreError::from(SqliteStoreError::from(error)))?;
        for record in &journal {
            apply_change(&native_tx, record).map_err(StoreError::from)?;
        }
        native_tx.commit().map_err(|error| StoreError::from(SqliteStoreError::from(error)))?;
        Ok((result, outcome))
    }

    fn view<F, R>(&self, body: F) -> Result<R, StoreError>
    where
        F: FnOnce(&TransactionView<'_>) -> Result<R, StoreError>,
    {
        let connection = self.connection.lock().map_err(|_| StoreError::from(SqliteStoreError::Poisoned))?;
        let snapshot = load_snapshot(&connection).map_err(StoreError::from)?;
        let view = TransactionView::new(&snapshot);
        body(&view)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use colonycore_core::Base;
    use colonycore_core::Container;
    use colonycore_core::OrganismStage;
    use colonycore_core::RuleView;

    use super::*;

    fn new_facility() -> Facility {
        Facility { base: Base::placeholder(), code: "F1".to_string(), name: "Main".to_string(), zone: "A".to_string(), access_policy: "staff".to_string(), extensions: Container::new() }
    }

    #[test]
    fn round_trips_an_entity_through_the_backing_table() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        let (created, _) = store.run_in_transaction(|tx| Ok(tx.create_facility(new_facility()))).expect("create succeeds");

        let loaded = store.view(|view| Ok(view.as_rule_view().find_facility(&created.base.id))).expect("view succeeds");
        assert_eq!(loaded, Some(created));
    }

    #[test]
    fn delete_removes_the_row() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        let (created, _) = store.run_in_transaction(|tx| Ok(tx.create_facility(new_facility()))).expect("create succeeds");
        store.run_in_transaction(|tx| tx.delete_facility(&created.base.id)).expect("delete succeeds");

        let count = store.view(|view| Ok(view.as_rule_view().list_facilities().len())).expect("view succeeds");
        assert_eq!(count, 0);
    }

    #[test]
    fn blocked_transaction_leaves_backing_tables_untouched() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        let (facility, _) = store.run_in_transaction(|tx| Ok(tx.create_facility(new_facility()))).expect("facility create succeeds");

        let housing = HousingUnit { base: Base::placeholder(), name: "H1".to_string(), facility_id: facility.base.id.clone(), capacity: 1, environment: "tank".to_string(), state: "active".to_string() };
        let (housing, _) = store.run_in_transaction(|tx| Ok(tx.create_housing_unit(housing))).expect("housing create succeeds");

        let organism = |suffix: &str| Organism {
            base: Base::placeholder(),
            name: format!("O{suffix}"),
            species: "frog".to_string(),
            line: "wild-type".to_string(),
            stage: OrganismStage::Adult,
            cohort_id: None,
            housing_id: Some(housing.base.id.clone()),
            protocol_id: None,
            project_id: None,
            extensions: Container::new(),
        };

        store.run_in_transaction(|tx| Ok(tx.create_organism(organism("1")))).expect("first occupant fits capacity");
        let blocked = store.run_in_transaction(|tx| Ok(tx.create_organism(organism("2"))));
        assert!(matches!(blocked, Err(StoreError::RuleViolation(_))));

        let count = store.view(|view| Ok(view.as_rule_view().list_organisms().len())).expect("view succeeds");
        assert_eq!(count, 1, "blocked transaction must not leave a second organism row");
    }
}
