//! `SQLite` schema for the monster catalogue.

/// One row per indexed stat block.
///
/// `cr_value` is the numeric form of `cr` used for range queries; it is
/// `NULL` when the printed rating has no numeric reading.
pub const CREATE_MONSTERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS monsters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    cr TEXT NOT NULL,
    cr_value REAL,
    ac TEXT NOT NULL,
    hp TEXT NOT NULL,
    languages TEXT NOT NULL,
    creature_type TEXT NOT NULL,
    skills TEXT NOT NULL,
    source TEXT NOT NULL,
    has_legendary INTEGER NOT NULL DEFAULT 0,
    file TEXT NOT NULL,
    content_hash TEXT NOT NULL UNIQUE,
    indexed_at TEXT NOT NULL
)
";

/// Index for case-insensitive name lookups.
pub const CREATE_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_monsters_name ON monsters(name COLLATE NOCASE)
";

/// Index for challenge rating ranges and ordering.
pub const CREATE_CR_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_monsters_cr ON monsters(cr_value)
";

/// Index for case-insensitive creature type filters.
pub const CREATE_TYPE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_monsters_type ON monsters(creature_type COLLATE NOCASE)
";

/// Key-value pairs, including the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_MONSTERS_TABLE,
    CREATE_NAME_INDEX,
    CREATE_CR_INDEX,
    CREATE_TYPE_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monsters_table_columns() {
        for column in [
            "name TEXT NOT NULL",
            "cr_value REAL",
            "creature_type TEXT NOT NULL",
            "has_legendary INTEGER",
            "content_hash TEXT NOT NULL UNIQUE",
            "indexed_at TEXT NOT NULL",
        ] {
            assert!(CREATE_MONSTERS_TABLE.contains(column), "missing {column}");
        }
    }

    #[test]
    fn test_metadata_table_is_last() {
        assert_eq!(SCHEMA_STATEMENTS.last(), Some(&CREATE_METADATA_TABLE));
    }
}
