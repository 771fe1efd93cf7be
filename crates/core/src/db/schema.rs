pub const SCHEMA: &str = "
-- One row per profile key, value is the JSON document for that key
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,         -- 'prompts', 'analytics', 'feedbackShown'
    value TEXT NOT NULL,          -- JSON text (or a plain flag)
    updated_at INTEGER NOT NULL   -- Unix timestamp (seconds)
);
";
