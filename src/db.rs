//! Database Handle
//! Mission: One shared SQLite connection, one table per entity type

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::debug;

/// Shared SQLite connection
///
/// Cloning is cheap; every clone talks to the same connection. Callers hold
/// the lock only for the statements of a single operation.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `url` and make sure the schema exists.
    /// `:memory:` gives a private in-memory database.
    pub fn open(url: &str) -> Result<Self> {
        let conn = if url == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(url)
        }
        .with_context(|| format!("Failed to open database at {}", url))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        debug!("Database ready at {}", url);
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                name TEXT NOT NULL,
                department TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                contact_name TEXT NOT NULL,
                contact_email TEXT NOT NULL,
                phone TEXT,
                industry TEXT,
                status TEXT NOT NULL,
                notes TEXT,
                owner_id TEXT NOT NULL,
                search_text TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS candidates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                position TEXT NOT NULL,
                status TEXT NOT NULL,
                skills TEXT NOT NULL,
                notes TEXT,
                client_id TEXT,
                owner_id TEXT NOT NULL,
                search_text TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_clients_owner ON clients(owner_id);
            CREATE INDEX IF NOT EXISTS idx_candidates_owner ON candidates(owner_id);
            CREATE INDEX IF NOT EXISTS idx_candidates_status ON candidates(status);",
        )
        .context("Failed to initialize database schema")?;

        // Databases created before the search column existed
        add_search_column(
            &conn,
            "candidates",
            "name || ' ' || email || ' ' || position || ' ' || skills",
        )?;
        add_search_column(
            &conn,
            "clients",
            "company_name || ' ' || contact_name || ' ' || contact_email || ' ' || coalesce(industry, '')",
        )?;

        Ok(())
    }
}

/// Add `search_text` to an older table and fill it from `source`, folded
/// with [`search_text`] since SQLite's `lower()` only handles ASCII.
fn add_search_column(conn: &Connection, table: &str, source: &str) -> Result<()> {
    let present: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = 'search_text'",
        [table],
        |row| row.get(0),
    )?;
    if present > 0 {
        return Ok(());
    }

    conn.execute_batch(&format!(
        "ALTER TABLE {table} ADD COLUMN search_text TEXT NOT NULL DEFAULT '';"
    ))
    .with_context(|| format!("Failed to add search column to {}", table))?;

    let mut select = conn.prepare(&format!("SELECT id, {source} FROM {table}"))?;
    let rows = select
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut update = conn.prepare(&format!(
        "UPDATE {table} SET search_text = ?2 WHERE id = ?1"
    ))?;
    for (id, text) in &rows {
        update.execute(params![id, search_text([text.as_str()])])?;
    }

    debug!("Added search_text column to {} ({} rows)", table, rows.len());
    Ok(())
}

/// Lowercased text that free-text searches match against. Folding happens
/// here rather than in SQL so non-ASCII letters compare the same way as
/// the query built by [`like_pattern`].
pub(crate) fn search_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(
    idx: usize,
    value: String,
) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_uuid(idx: usize, value: String) -> rusqlite::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Turn a free-text search into a `LIKE` pattern
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_schema_created_in_memory() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('users', 'clients', 'candidates')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_reopen_on_disk_is_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        Database::open(path).unwrap();
        // Schema creation must tolerate existing tables
        Database::open(path).unwrap();
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" Rust "), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_search_text_folds_unicode() {
        let text = search_text(["Émile Zola", "ÉCRIVAIN"]);
        assert_eq!(text, "émile zola\nécrivain");
        assert!(text.contains(like_pattern("ÉMILE").trim_matches('%')));
    }

    #[test]
    fn test_search_column_added_to_older_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE clients (
                 id TEXT PRIMARY KEY, company_name TEXT NOT NULL, contact_name TEXT NOT NULL,
                 contact_email TEXT NOT NULL, industry TEXT
             );
             INSERT INTO clients VALUES ('1', 'Acme', 'Pat', 'pat@acme.test', NULL);
             INSERT INTO clients VALUES ('2', 'Société Générale', 'Zoé', 'zoe@sg.test', 'BANKING');",
        )
        .unwrap();

        add_search_column(
            &conn,
            "clients",
            "company_name || ' ' || contact_name || ' ' || contact_email || ' ' || coalesce(industry, '')",
        )
        .unwrap();
        // Second call is a no-op
        add_search_column(&conn, "clients", "company_name").unwrap();

        let text: String = conn
            .query_row("SELECT search_text FROM clients WHERE id = '1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(text, "acme pat pat@acme.test ");
        let text: String = conn
            .query_row("SELECT search_text FROM clients WHERE id = '2'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(text, "société générale zoé zoe@sg.test banking");
    }
}
