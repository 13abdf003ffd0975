pub const SCHEMA: &str = r#"
-- ranked stories, one table per category
CREATE TABLE IF NOT EXISTS top_stories (
    id INTEGER PRIMARY KEY,
    position INTEGER NOT NULL,
    title TEXT,
    author TEXT,
    score INTEGER,
    url TEXT,
    fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_top_stories_position ON top_stories(position);

CREATE TABLE IF NOT EXISTS best_stories (
    id INTEGER PRIMARY KEY,
    position INTEGER NOT NULL,
    title TEXT,
    author TEXT,
    score INTEGER,
    url TEXT,
    fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_best_stories_position ON best_stories(position);

-- summaries, keyed by the owning story id
CREATE TABLE IF NOT EXISTS summaries_top (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL DEFAULT '',
    summary TEXT NOT NULL,
    generated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS summaries_best (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL DEFAULT '',
    summary TEXT NOT NULL,
    generated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
