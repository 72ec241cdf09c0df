/// Schema for the offline store and the listing cache.
pub const SCHEMA: &str = r#"
-- Articles kept for offline reading. `seq` preserves first-save order and is
-- left untouched by upserts.
CREATE TABLE IF NOT EXISTS offline_articles (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id INTEGER NOT NULL UNIQUE,
    title TEXT NOT NULL,
    data BLOB NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Cached remote listings (stores serialized JSON entries in order)
CREATE TABLE IF NOT EXISTS listing_cache (
    query_hash TEXT PRIMARY KEY,
    query_description TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    data BLOB NOT NULL,
    total INTEGER NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
