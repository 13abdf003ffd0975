use chrono::{DateTime, Utc};
use rusqlite::{params, Row, TransactionBehavior};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Category, DigestEntry, Story, StoredStory, StorySummary};

use super::schema::SCHEMA;
use super::Generation;

/// Sole writer of the story and summary tables.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::debug!(journal_mode = %mode, "Opened database");
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Replace the stored result set of `category` with `new_items` and their
    /// summaries.
    #[allow(dead_code)]
    pub async fn refresh(
        &self,
        category: Category,
        new_items: Vec<Story>,
        new_summaries: Vec<StorySummary>,
    ) -> Result<()> {
        let mut generation = Generation::new(category, new_items);
        generation.extend(new_summaries);
        self.commit(generation).await
    }

    /// Swap in a staged generation inside a single transaction. Either the
    /// whole generation lands or the previous one is left untouched.
    pub async fn commit(&self, generation: Generation) -> Result<()> {
        generation.verify()?;
        let (category, stories, summaries) = generation.into_parts();
        let story_count = stories.len();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                tx.execute(&format!("DELETE FROM {}", category.summaries_table()), [])?;
                tx.execute(&format!("DELETE FROM {}", category.stories_table()), [])?;

                {
                    let mut insert = tx.prepare(&format!(
                        "INSERT INTO {} (id, position, title, author, score, url) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        category.stories_table()
                    ))?;
                    for (position, story) in stories.iter().enumerate() {
                        insert.execute(params![
                            story.id,
                            position as i64,
                            story.title,
                            story.author,
                            story.score,
                            story.url,
                        ])?;
                    }
                }

                {
                    let mut upsert = tx.prepare(&format!(
                        r#"INSERT INTO {} (id, url, summary)
                           VALUES (?1, ?2, ?3)
                           ON CONFLICT(id) DO UPDATE SET
                               url = excluded.url,
                               summary = excluded.summary,
                               generated_at = datetime('now')"#,
                        category.summaries_table()
                    ))?;
                    for summary in &summaries {
                        upsert.execute(params![summary.id, summary.url, summary.summary])?;
                    }
                }

                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|source| AppError::StoreCommit { category, source })?;

        tracing::debug!(%category, stories = story_count, "Committed generation");
        Ok(())
    }

    pub async fn get_stories(&self, category: Category) -> Result<Vec<StoredStory>> {
        let stories = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT id, title, author, score, url, position, fetched_at FROM {} ORDER BY position",
                    category.stories_table()
                ))?;
                let stories = stmt
                    .query_map([], stored_story_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(stories)
            })
            .await?;
        Ok(stories)
    }

    pub async fn get_summaries(&self, category: Category) -> Result<Vec<StorySummary>> {
        let summaries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT id, url, summary FROM {} ORDER BY id",
                    category.summaries_table()
                ))?;
                let summaries = stmt
                    .query_map([], |row| summary_from_row(row, 0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await?;
        Ok(summaries)
    }

    /// Stories in ranked order, each with its summary.
    pub async fn get_digest(&self, category: Category) -> Result<Vec<DigestEntry>> {
        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT s.id, s.title, s.author, s.score, s.url, s.position, s.fetched_at,
                              m.id, m.url, m.summary
                       FROM {} s
                       LEFT JOIN {} m ON m.id = s.id
                       ORDER BY s.position"#,
                    category.stories_table(),
                    category.summaries_table()
                ))?;
                let entries = stmt
                    .query_map([], |row| {
                        let stored = stored_story_from_row(row)?;
                        let summary = match row.get::<_, Option<i64>>(7)? {
                            Some(_) => Some(summary_from_row(row, 7)?),
                            None => None,
                        };
                        Ok(DigestEntry { stored, summary })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await?;
        Ok(entries)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn stored_story_from_row(row: &Row) -> rusqlite::Result<StoredStory> {
    Ok(StoredStory {
        story: Story {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            score: row.get(3)?,
            url: row.get(4)?,
        },
        position: row.get(5)?,
        fetched_at: row
            .get::<_, String>(6)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

fn summary_from_row(row: &Row, offset: usize) -> rusqlite::Result<StorySummary> {
    Ok(StorySummary {
        id: row.get(offset)?,
        url: row.get(offset + 1)?,
        summary: row.get(offset + 2)?,
    })
}
