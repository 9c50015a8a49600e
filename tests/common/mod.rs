//! In-memory session executing the statement shapes cqlx generates.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;

use cqlx::query::Rows;
use cqlx::types::DataType;
use cqlx::{DriverError, Row, Session, TableMetadata, Value};
use parking_lot::Mutex;

/// Routes cqlx logs to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Parsed form of a generated statement.
#[derive(Debug, Clone)]
pub enum Plan {
    Insert {
        table: String,
        columns: Vec<String>,
    },
    Select {
        table: String,
        columns: Vec<String>,
        keys: Vec<String>,
    },
    Update {
        table: String,
        set: Vec<String>,
        keys: Vec<String>,
    },
    Delete {
        table: String,
        keys: Vec<String>,
    },
}

#[derive(Debug)]
pub struct Prepared {
    pub id: usize,
    pub plan: Plan,
}

#[derive(Debug, Default)]
struct Store {
    primary_keys: HashMap<String, Vec<String>>,
    rows: HashMap<String, Vec<Row>>,
}

/// Session backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemorySession {
    store: Mutex<Store>,
    param_types: Mutex<HashMap<String, Vec<DataType>>>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
    texts: Mutex<HashMap<usize, String>>,
    prepared: AtomicUsize,
    released: AtomicUsize,
    fail_execute: AtomicBool,
}

#[derive(Debug)]
struct MemoryError(String);

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MemoryError {}

fn fail(message: impl Into<String>) -> DriverError {
    Box::new(MemoryError(message.into()))
}

fn split_list(list: &str, sep: &str) -> Vec<String> {
    list.split(sep)
        .map(|s| s.trim().trim_end_matches("=?").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse(text: &str) -> Result<Plan, DriverError> {
    if let Some(rest) = text.strip_prefix("INSERT INTO ") {
        let (table, rest) = rest.split_once(" (").ok_or_else(|| fail("bad insert"))?;
        let (columns, _) = rest.split_once(") VALUES").ok_or_else(|| fail("bad insert"))?;
        return Ok(Plan::Insert {
            table: table.to_string(),
            columns: split_list(columns, ","),
        });
    }
    if let Some(rest) = text.strip_prefix("SELECT ") {
        let (columns, rest) = rest.split_once(" FROM ").ok_or_else(|| fail("bad select"))?;
        let (table, keys) = rest.split_once(" WHERE ").ok_or_else(|| fail("bad select"))?;
        return Ok(Plan::Select {
            table: table.to_string(),
            columns: split_list(columns, ","),
            keys: split_list(keys, " AND "),
        });
    }
    if let Some(rest) = text.strip_prefix("UPDATE ") {
        let (table, rest) = rest.split_once(" SET ").ok_or_else(|| fail("bad update"))?;
        let (set, keys) = rest.split_once(" WHERE ").ok_or_else(|| fail("bad update"))?;
        return Ok(Plan::Update {
            table: table.to_string(),
            set: split_list(set, ","),
            keys: split_list(keys, " AND "),
        });
    }
    if let Some(rest) = text.strip_prefix("DELETE FROM ") {
        let (table, keys) = rest.split_once(" WHERE ").ok_or_else(|| fail("bad delete"))?;
        return Ok(Plan::Delete {
            table: table.to_string(),
            keys: split_list(keys, " AND "),
        });
    }
    Err(fail(format!("unsupported statement: {text}")))
}

fn matches_keys(row: &Row, keys: &[String], values: &[Value]) -> bool {
    keys.iter()
        .zip(values)
        .all(|(k, v)| row.get(k).unwrap_or(&Value::Null) == v)
}

impl MemorySession {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// Registers a table so inserts upsert by primary key.
    pub fn with_table(self, metadata: &TableMetadata) -> Self {
        {
            let mut store = self.store.lock();
            store.primary_keys.insert(
                metadata.name().to_string(),
                metadata.primary_key().cloned().collect(),
            );
            store.rows.entry(metadata.name().to_string()).or_default();
        }
        self
    }

    /// Reports `types` as the bind marker types of statement `text`.
    pub fn with_param_types(self, text: &str, types: Vec<DataType>) -> Self {
        self.param_types.lock().insert(text.to_string(), types);
        self
    }

    pub fn fail_next_execute(&self) {
        self.fail_execute.store(true, Ordering::SeqCst);
    }

    pub fn prepared_count(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().clone()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.store.lock().rows.get(table).map_or(0, Vec::len)
    }

    /// Inserts a row directly, bypassing statements.
    pub fn put_row(&self, table: &str, row: Row) {
        self.store
            .lock()
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn upsert(store: &mut Store, table: &str, row: Row) {
        let keys = store.primary_keys.get(table).cloned().unwrap_or_default();
        let rows = store.rows.entry(table.to_string()).or_default();
        let key_values: Vec<Value> = keys
            .iter()
            .map(|k| row.get(k).cloned().unwrap_or(Value::Null))
            .collect();
        match rows
            .iter_mut()
            .find(|r| !keys.is_empty() && matches_keys(r, &keys, &key_values))
        {
            Some(existing) => {
                for (c, v) in row.iter() {
                    existing.set(c, v.clone());
                }
            }
            None => rows.push(row),
        }
    }
}

impl Session for MemorySession {
    type Prepared = Prepared;

    fn prepare(&self, statement: &str) -> Result<Prepared, DriverError> {
        let plan = parse(statement)?;
        let id = self.prepared.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().insert(id, statement.to_string());
        Ok(Prepared { id, plan })
    }

    fn execute<'a>(&'a self, prepared: &Prepared, values: &[Value]) -> Result<Rows<'a>, DriverError> {
        if self.fail_execute.swap(false, Ordering::SeqCst) {
            return Err(fail("node unavailable"));
        }

        let text = self.texts.lock().get(&prepared.id).cloned().unwrap_or_default();
        self.log.lock().push((text, values.to_vec()));

        let mut store = self.store.lock();
        let out: Vec<Row> = match &prepared.plan {
            Plan::Insert { table, columns } => {
                let row: Row = columns.iter().cloned().zip(values.iter().cloned()).collect();
                Self::upsert(&mut store, table, row);
                Vec::new()
            }
            Plan::Select { table, columns, keys } => store
                .rows
                .get(table)
                .map(|rows| {
                    rows.iter()
                        .filter(|r| matches_keys(r, keys, values))
                        .map(|r| {
                            columns
                                .iter()
                                .map(|c| (c.clone(), r.get(c).cloned().unwrap_or(Value::Null)))
                                .collect::<Row>()
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Plan::Update { table, set, keys } => {
                let (set_values, key_values) = values.split_at(set.len());
                let row: Row = keys
                    .iter()
                    .cloned()
                    .zip(key_values.iter().cloned())
                    .chain(set.iter().cloned().zip(set_values.iter().cloned()))
                    .collect();
                Self::upsert(&mut store, table, row);
                Vec::new()
            }
            Plan::Delete { table, keys } => {
                if let Some(rows) = store.rows.get_mut(table) {
                    rows.retain(|r| !matches_keys(r, keys, values));
                }
                Vec::new()
            }
        };

        Ok(Box::new(out.into_iter().map(Ok)))
    }

    fn param_types(&self, prepared: &Prepared) -> Option<Vec<DataType>> {
        let text = self.texts.lock().get(&prepared.id).cloned()?;
        self.param_types.lock().get(&text).cloned()
    }

    fn release(&self, _prepared: Prepared) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Person table used across the integration tests.
pub fn person_metadata() -> TableMetadata {
    TableMetadata::new(
        "person",
        ["first_name", "last_name", "email"],
        ["first_name"],
        ["last_name"],
    )
    .expect("valid person metadata")
}

/// Row of the person table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email: Vec<String>,
}

cqlx::record!(Person {
    first_name,
    last_name,
    email
});

pub fn patricia() -> Person {
    Person {
        first_name: "Patricia".into(),
        last_name: "Citizen".into(),
        email: vec!["patricia.citzen@gocqlx_test.com".into()],
    }
}
