//! SQL schema for the SenseAble SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT UNIQUE,
    created_at  TEXT NOT NULL
);

-- At most one row per user; created on first update.
CREATE TABLE IF NOT EXISTS preferences (
    preference_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id              INTEGER NOT NULL UNIQUE
                           REFERENCES users(user_id) ON DELETE CASCADE,
    accessibility_need   TEXT,
    reading_level        TEXT,
    preferred_complexity TEXT,
    color_palette        TEXT,   -- JSON object of string -> string
    other_preferences    TEXT    -- JSON object
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    phrase            TEXT NOT NULL,
    familiarity_level TEXT NOT NULL,   -- 'not-familiar' | 'somewhat-familiar' | 'familiar'
    created_at        TEXT NOT NULL
);

-- Rephrase history is append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS rephrase_history (
    history_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    original_text  TEXT NOT NULL,
    rephrased_text TEXT NOT NULL,
    version        INTEGER NOT NULL DEFAULT 1 CHECK (version > 0),
    created_at     TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

-- Only the SHA-256 digest of a bearer token is kept.
CREATE TABLE IF NOT EXISTS auth_tokens (
    token_hash  TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tags_user_idx      ON tags(user_id);
CREATE INDEX IF NOT EXISTS history_user_idx   ON rephrase_history(user_id, created_at);
CREATE INDEX IF NOT EXISTS history_text_idx   ON rephrase_history(user_id, original_text);

PRAGMA user_version = 1;
";
