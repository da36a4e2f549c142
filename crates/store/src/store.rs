// Supplier table on SQLite

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use vendorbook_core::{
    ApplyMode, RecordSummary, SupplierFields, SupplierId, SupplierRecord, TagSet,
};

use crate::batch::{BatchOp, BatchOutcome};
use crate::error::StoreError;
use crate::query::{ListQuery, Page};

// AUTOINCREMENT keeps ids from being reused after deletes.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS suppliers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    legal_name TEXT NOT NULL,
    external_id TEXT,
    is_prospect INTEGER NOT NULL DEFAULT 0,
    address TEXT,
    region TEXT NOT NULL,
    contacts TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '',           -- comma-joined tag labels
    audit_status TEXT NOT NULL,
    comments TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,                -- RFC 3339, UTC, microseconds
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS suppliers_legal_name ON suppliers (legal_name);
"#;

const COLUMNS: &str = "id, legal_name, external_id, is_prospect, address, region, contacts, \
                       tags, audit_status, comments, created_at, updated_at";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Storage(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        log::debug!("opened supplier store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        // SQLite's lower() only folds ASCII.
        conn.create_scalar_function(
            "vb_fold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: String = ctx.get(0)?;
                Ok(text.to_lowercase())
            },
        )?;
        Ok(Self { conn })
    }

    /// Insert a new record. `created_at == updated_at == now`.
    pub fn create(&self, fields: &SupplierFields) -> Result<SupplierId, StoreError> {
        let id = insert(&self.conn, fields, now())?;
        log::debug!("created supplier {id}");
        Ok(id)
    }

    pub fn read(&self, id: SupplierId) -> Result<Option<SupplierRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM suppliers WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], record_from_row)
            .optional()?)
    }

    /// Like [`Store::read`], but absence is an error.
    pub fn get(&self, id: SupplierId) -> Result<SupplierRecord, StoreError> {
        self.read(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Overwrite every mutable field and refresh `updated_at`.
    pub fn update(&self, id: SupplierId, fields: &SupplierFields) -> Result<(), StoreError> {
        let fields = normalize(fields)?;
        let updated_at = next_updated_at(&self.conn, id)?.ok_or(StoreError::NotFound(id))?;
        self.conn.execute(
            "UPDATE suppliers SET legal_name = ?1, external_id = ?2, is_prospect = ?3, \
             address = ?4, region = ?5, contacts = ?6, tags = ?7, audit_status = ?8, \
             comments = ?9, updated_at = ?10 WHERE id = ?11",
            params![
                fields.legal_name,
                fields.external_id,
                fields.is_prospect,
                fields.address,
                fields.region.label(),
                fields.contacts,
                fields.tags.to_storage(),
                fields.audit_status.label(),
                fields.comments,
                format_timestamp(updated_at),
                id.0,
            ],
        )?;
        log::debug!("updated supplier {id}");
        Ok(())
    }

    /// Remove a record. Returns whether a row was removed; absent ids are fine.
    pub fn delete(&self, id: SupplierId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM suppliers WHERE id = ?1", params![id.0])?;
        Ok(removed > 0)
    }

    /// Remove every record. Irreversible; callers gate this behind confirmation.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let removed = self.conn.execute("DELETE FROM suppliers", [])?;
        log::info!("deleted all {removed} supplier(s)");
        Ok(removed)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM suppliers", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// One page of records matching the query, plus the filtered total.
    pub fn list(&self, query: &ListQuery) -> Result<Page, StoreError> {
        let (predicate, mut values) = query.predicate();

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM suppliers WHERE {predicate}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let direction = if query.ascending { "ASC" } else { "DESC" };
        let sql = format!(
            "SELECT {COLUMNS} FROM suppliers WHERE {predicate} \
             ORDER BY {} {direction}, id ASC LIMIT ? OFFSET ?",
            query.sort.order_expr()
        );
        // LIMIT -1 is SQLite for "no limit"
        values.push(Value::Integer(query.limit.map(i64::from).unwrap_or(-1)));
        values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            records,
            total: total as u64,
        })
    }

    /// Every record, ordered by id.
    pub fn records(&self) -> Result<Vec<SupplierRecord>, StoreError> {
        Ok(self.list(&ListQuery::default())?.records)
    }

    /// Legal name → summary, for prefilling forms. On a shared name the
    /// most recently created record wins.
    pub fn lookup_by_name(&self) -> Result<BTreeMap<String, RecordSummary>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, legal_name, external_id, address FROM suppliers ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                RecordSummary {
                    id: SupplierId(row.get(0)?),
                    external_id: row.get(2)?,
                    address: row.get(3)?,
                },
            ))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (name, summary) = row?;
            let id = summary.id;
            if let Some(previous) = map.insert(name.clone(), summary) {
                log::warn!(
                    "legal name '{name}' is shared by suppliers {} and {id}; using {id}",
                    previous.id
                );
            }
        }
        Ok(map)
    }

    /// Run a list of writes. See [`ApplyMode`] for the failure contract.
    pub fn apply_batch(
        &mut self,
        ops: &[BatchOp],
        mode: ApplyMode,
    ) -> Result<BatchOutcome, StoreError> {
        let outcome = match mode {
            ApplyMode::Transactional => {
                let tx = self.conn.transaction()?;
                let outcome = run_ops(&tx, ops)?;
                tx.commit()?;
                outcome
            }
            ApplyMode::BestEffort => run_ops(&self.conn, ops)?,
        };
        log::info!(
            "batch applied ({mode}): {} inserted, {} updated, {} skipped",
            outcome.inserted,
            outcome.updated,
            outcome.skipped
        );
        Ok(outcome)
    }
}

fn run_ops(conn: &Connection, ops: &[BatchOp]) -> Result<BatchOutcome, StoreError> {
    let mut outcome = BatchOutcome::default();
    let at = now();

    for op in ops {
        match op {
            BatchOp::Insert(fields) => {
                if name_taken(conn, fields.legal_name.trim())? {
                    log::warn!(
                        "supplier '{}' already exists; import insert skipped",
                        fields.legal_name.trim()
                    );
                    outcome.skipped += 1;
                } else {
                    insert(conn, fields, at)?;
                    outcome.inserted += 1;
                }
            }
            BatchOp::SetImportFields {
                id,
                external_id,
                address,
            } => match next_updated_at(conn, *id)? {
                Some(updated_at) => {
                    conn.execute(
                        "UPDATE suppliers SET external_id = ?1, address = ?2, updated_at = ?3 \
                         WHERE id = ?4",
                        params![external_id, address, format_timestamp(updated_at), id.0],
                    )?;
                    outcome.updated += 1;
                }
                None => {
                    log::warn!("supplier {id} no longer exists; import update skipped");
                    outcome.skipped += 1;
                }
            },
        }
    }

    Ok(outcome)
}

fn insert(
    conn: &Connection,
    fields: &SupplierFields,
    at: DateTime<Utc>,
) -> Result<SupplierId, StoreError> {
    let fields = normalize(fields)?;
    let ts = format_timestamp(at);
    conn.execute(
        "INSERT INTO suppliers (legal_name, external_id, is_prospect, address, region, \
         contacts, tags, audit_status, comments, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            fields.legal_name,
            fields.external_id,
            fields.is_prospect,
            fields.address,
            fields.region.label(),
            fields.contacts,
            fields.tags.to_storage(),
            fields.audit_status.label(),
            fields.comments,
            ts,
        ],
    )?;
    Ok(SupplierId(conn.last_insert_rowid()))
}

fn name_taken(conn: &Connection, legal_name: &str) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM suppliers WHERE legal_name = ?1 LIMIT 1",
            params![legal_name],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Trim the legal name (required) and store blank optionals as NULL.
fn normalize(fields: &SupplierFields) -> Result<SupplierFields, StoreError> {
    let legal_name = fields.legal_name.trim();
    if legal_name.is_empty() {
        return Err(StoreError::Validation("legal name is required".into()));
    }
    Ok(SupplierFields {
        legal_name: legal_name.to_string(),
        external_id: blank_to_none(&fields.external_id),
        address: blank_to_none(&fields.address),
        ..fields.clone()
    })
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// The `updated_at` a mutation of `id` should write, or `None` if the row is
/// gone. Always later than the stored value, even if the clock has not moved.
fn next_updated_at(
    conn: &Connection,
    id: SupplierId,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    let previous: Option<String> = conn
        .query_row(
            "SELECT updated_at FROM suppliers WHERE id = ?1",
            params![id.0],
            |row| row.get(0),
        )
        .optional()?;

    let Some(previous) = previous else {
        return Ok(None);
    };
    let previous = parse_timestamp(&previous)
        .map_err(|e| StoreError::Storage(format!("supplier {id}: bad updated_at: {e}")))?;

    let now = now();
    Ok(Some(if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }))
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SupplierRecord> {
    let tags: String = row.get(7)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(SupplierRecord {
        id: SupplierId(row.get(0)?),
        fields: SupplierFields {
            legal_name: row.get(1)?,
            external_id: row.get(2)?,
            is_prospect: row.get(3)?,
            address: row.get(4)?,
            region: parse_column(row, 5)?,
            contacts: row.get(6)?,
            tags: TagSet::from_storage(&tags).map_err(|e| conversion_error(7, e))?,
            audit_status: parse_column(row, 8)?,
            comments: row.get(9)?,
        },
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(10, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(11, e))?,
    })
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
