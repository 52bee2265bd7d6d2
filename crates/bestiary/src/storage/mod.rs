//! Storage layer for the monster catalogue.
//!
//! This module provides `SQLite`-based persistent storage for index
//! records, with deduplication, filtered search and statistics.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::MonsterRecord;

const MONSTER_COLUMNS: &str = "id, name, cr, ac, hp, languages, creature_type, skills, source, \
     has_legendary, file, indexed_at";

/// Storage engine for the catalogue.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Record insertion with deduplication
/// - Filtering by name, type, challenge rating and legendary actions
/// - Catalogue statistics
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// A catalogued record with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMonster {
    /// Row id.
    pub id: i64,
    /// The indexed record.
    pub record: MonsterRecord,
    /// When the record entered the catalogue.
    pub indexed_at: DateTime<Utc>,
}

/// Catalogue search filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterQuery {
    /// Case-insensitive substring of the name.
    pub text: Option<String>,
    /// Creature type, compared case-insensitively.
    pub creature_type: Option<String>,
    /// Lowest numeric challenge rating, inclusive.
    pub min_cr: Option<f64>,
    /// Highest numeric challenge rating, inclusive.
    pub max_cr: Option<f64>,
    /// Only creatures with legendary actions.
    pub legendary_only: bool,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl Storage {
    /// Open or create a catalogue at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening catalogue at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Catalogue opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a record.
    ///
    /// Returns the assigned ID, or `None` if an identical record is
    /// already catalogued.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing the record or the database operation fails.
    pub fn insert(&self, record: &MonsterRecord) -> Result<Option<i64>> {
        let hash = record.content_hash()?;
        if self.exists_by_hash(&hash)? {
            debug!("Skipping duplicate record {} ({})", record.name, &hash[..16]);
            return Ok(None);
        }

        let indexed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.conn.execute(
            r"
            INSERT INTO monsters (name, cr, cr_value, ac, hp, languages, creature_type,
                skills, source, has_legendary, file, content_hash, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
            params![
                record.name,
                record.cr,
                record.cr_value(),
                record.ac,
                record.hp,
                record.languages,
                record.creature_type,
                record.skills,
                record.source,
                record.has_legendary_actions,
                record.file,
                hash,
                indexed_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted {} with id {}", record.name, id);
        Ok(Some(id))
    }

    fn exists_by_hash(&self, hash: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM monsters WHERE content_hash = ?1",
            [hash],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a record by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<StoredMonster>> {
        let sql = format!("SELECT {MONSTER_COLUMNS} FROM monsters WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id], Self::row_to_monster)
            .optional()?;
        Ok(result)
    }

    /// Search the catalogue.
    ///
    /// Results are ordered by numeric challenge rating, then name; records
    /// without a numeric rating come last.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn search(&self, query: &MonsterQuery) -> Result<Vec<StoredMonster>> {
        let pattern = format!("%{}%", escape_like(query.text.as_deref().unwrap_or_default()));
        let limit = query
            .limit
            .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));

        let sql = format!(
            r"
            SELECT {MONSTER_COLUMNS} FROM monsters
            WHERE name LIKE ?1 ESCAPE '\'
              AND (?2 IS NULL OR creature_type = ?2 COLLATE NOCASE)
              AND (?3 IS NULL OR cr_value >= ?3)
              AND (?4 IS NULL OR cr_value <= ?4)
              AND (?5 = 0 OR has_legendary = 1)
            ORDER BY cr_value IS NULL, cr_value, name COLLATE NOCASE
            LIMIT ?6
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let monsters = stmt
            .query_map(
                params![
                    pattern,
                    query.creature_type,
                    query.min_cr,
                    query.max_cr,
                    query.legendary_only,
                    limit,
                ],
                Self::row_to_monster,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Search matched {} records", monsters.len());
        Ok(monsters)
    }

    /// Count catalogued records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM monsters", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a record by ID.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM monsters WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Remove every record. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM monsters", [])?;
        if affected > 0 {
            info!("Cleared {} records from the catalogue", affected);
        }
        Ok(affected)
    }

    /// Get catalogue statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total = self.count()?;
        let legendary: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM monsters WHERE has_legendary = 1",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            r"
            SELECT creature_type, COUNT(*) AS n FROM monsters
            GROUP BY creature_type COLLATE NOCASE
            ORDER BY n DESC, creature_type COLLATE NOCASE
            ",
        )?;
        let by_type = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<(String, i64)>, _>>()?;

        let (first, last): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(indexed_at), MAX(indexed_at) FROM monsters",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let parse = |s: Option<String>| {
            s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total,
            legendary,
            by_type,
            first_indexed: parse(first),
            last_indexed: parse(last),
            db_size_bytes,
        })
    }

    fn row_to_monster(row: &rusqlite::Row) -> rusqlite::Result<StoredMonster> {
        let indexed_at: String = row.get(11)?;
        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        Ok(StoredMonster {
            id: row.get(0)?,
            record: MonsterRecord {
                name: row.get(1)?,
                cr: row.get(2)?,
                ac: row.get(3)?,
                hp: row.get(4)?,
                languages: row.get(5)?,
                creature_type: row.get(6)?,
                skills: row.get(7)?,
                source: row.get(8)?,
                has_legendary_actions: row.get(9)?,
                file: row.get(10)?,
            },
            indexed_at,
        })
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Statistics about the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of records.
    pub total: i64,
    /// Records with legendary actions.
    pub legendary: i64,
    /// Record count per creature type, most common first.
    pub by_type: Vec<(String, i64)>,
    /// When the earliest record was indexed.
    pub first_indexed: Option<DateTime<Utc>>,
    /// When the latest record was indexed.
    pub last_indexed: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
