use rusqlite::{Connection, Result};

/// Initialize media catalog database schema
pub fn init_catalog_schema(conn: &Connection) -> Result<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Schema version table for the catalog
    conn.execute(
        "CREATE TABLE IF NOT EXISTS catalog_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Check current catalog schema version
    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM catalog_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_catalog_schema_v1(conn)?;
        conn.execute(
            "INSERT INTO catalog_schema_version (version) VALUES (1)",
            [],
        )?;
    }

    Ok(())
}

/// Create media catalog schema version 1
fn create_catalog_schema_v1(conn: &Connection) -> Result<()> {
    // Table: albums - user-created groupings, shown after the smart albums
    conn.execute(
        "CREATE TABLE IF NOT EXISTS albums (
            uuid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Table: assets - one row per photo or video file
    conn.execute(
        "CREATE TABLE IF NOT EXISTS assets (
            uuid TEXT PRIMARY KEY,
            album_id TEXT,
            kind TEXT NOT NULL CHECK(kind IN ('image', 'video')),
            path TEXT NOT NULL,
            duration REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            width INTEGER NOT NULL DEFAULT 0,
            height INTEGER NOT NULL DEFAULT 0,
            favorite INTEGER NOT NULL DEFAULT 0 CHECK(favorite IN (0,1)),
            slomo INTEGER NOT NULL DEFAULT 0 CHECK(slomo IN (0,1)),
            burst_id TEXT,
            FOREIGN KEY (album_id) REFERENCES albums(uuid) ON DELETE SET NULL
        )",
        [],
    )?;

    // Index for assets by album
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assets_album ON assets(album_id)",
        [],
    )?;

    // Index for assets by kind
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assets_kind ON assets(kind)",
        [],
    )?;

    // Index for assets by creation time (display order)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assets_created ON assets(created_at)",
        [],
    )?;

    Ok(())
}
