use crate::schema::{InvestigationResult, SavedFactCheck};
use crate::verdict::{classify_confidence, classify_verdict, VerdictLabel};
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

// Fixed width so that text ordering in SQLite is chronological.
const CREATED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init(&conn)?;
    Ok(conn)
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS saved_fact_checks (
          id TEXT PRIMARY KEY,
          user_id TEXT NOT NULL,
          claim TEXT NOT NULL,
          verdict TEXT NOT NULL,
          confidence_level INTEGER NOT NULL,
          full_json TEXT NOT NULL,
          created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_saved_user_created
          ON saved_fact_checks(user_id, created_at);
        "#,
    )?;
    Ok(())
}

pub fn save_fact_check(
    conn: &Connection,
    user_id: &str,
    result: &InvestigationResult,
) -> Result<SavedFactCheck> {
    let saved = SavedFactCheck {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        claim: result.query.clone(),
        verdict: result.verdict.clone(),
        confidence_level: classify_confidence(&result.confidence_level),
        created_at: OffsetDateTime::now_utc().format(CREATED_AT_FORMAT)?,
        full_data: result.clone(),
    };
    let full_json = serde_json::to_string(&saved.full_data)?;

    conn.execute(
        r#"
        INSERT INTO saved_fact_checks (
          id, user_id, claim, verdict, confidence_level, full_json, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            saved.id,
            saved.user_id,
            saved.claim,
            saved.verdict,
            saved.confidence_level,
            full_json,
            saved.created_at
        ],
    )?;
    debug!(id = %saved.id, user = user_id, "saved fact-check");

    Ok(saved)
}

#[derive(Debug, Clone, Default)]
pub struct SavedFilter {
    pub search: Option<String>,
    /// Classifier label to keep; `None` keeps everything.
    pub verdict: Option<VerdictLabel>,
}

impl SavedFilter {
    fn matches(&self, check: &SavedFactCheck) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !check.claim.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        match self.verdict {
            None => true,
            Some(wanted) => classify_verdict(&check.verdict).label == wanted,
        }
    }
}

/// Saved checks for `user_id`, newest first.
pub fn list_fact_checks(
    conn: &Connection,
    user_id: &str,
    filter: &SavedFilter,
) -> Result<Vec<SavedFactCheck>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, user_id, claim, verdict, confidence_level, full_json, created_at
        FROM saved_fact_checks
        WHERE user_id = ?1
        ORDER BY created_at DESC, rowid DESC
        "#,
    )?;

    let rows = stmt.query_map(params![user_id], read_row)?;

    let mut checks = Vec::new();
    for row in rows {
        let (partial, full_json) = row?;
        let check = partial.with_data(serde_json::from_str(&full_json)?);
        if filter.matches(&check) {
            checks.push(check);
        }
    }
    Ok(checks)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<(PartialCheck, String)> {
    Ok((
        PartialCheck {
            id: row.get(0)?,
            user_id: row.get(1)?,
            claim: row.get(2)?,
            verdict: row.get(3)?,
            confidence_level: row.get(4)?,
            created_at: row.get(6)?,
        },
        row.get(5)?,
    ))
}

struct PartialCheck {
    id: String,
    user_id: String,
    claim: String,
    verdict: String,
    confidence_level: u8,
    created_at: String,
}

impl PartialCheck {
    fn with_data(self, full_data: InvestigationResult) -> SavedFactCheck {
        SavedFactCheck {
            id: self.id,
            user_id: self.user_id,
            claim: self.claim,
            verdict: self.verdict,
            confidence_level: self.confidence_level,
            created_at: self.created_at,
            full_data,
        }
    }
}

/// Returns whether a row was removed. Another user's id is never touched.
pub fn delete_fact_check(conn: &Connection, user_id: &str, id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM saved_fact_checks WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    debug!(id, user = user_id, removed, "delete fact-check");
    Ok(removed > 0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedStats {
    pub total: usize,
    pub verified: usize,
    pub false_count: usize,
}

pub fn saved_stats(checks: &[SavedFactCheck]) -> SavedStats {
    let mut stats = SavedStats {
        total: checks.len(),
        ..SavedStats::default()
    };
    for check in checks {
        match classify_verdict(&check.verdict).label {
            VerdictLabel::Verified => stats.verified += 1,
            VerdictLabel::False => stats.false_count += 1,
            VerdictLabel::Unverified => {}
        }
    }
    stats
}
