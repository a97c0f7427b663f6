use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::context::ContextKey;
use crate::core::error::StorageError;
use crate::core::message::{Message, MessageRole};
use crate::core::session::{Session, SessionId};

/// Persisted-store collaborator: saves whole sessions, loads them back in
/// display order, and answers naive similarity queries over archived text.
pub struct ArchiveRepo {
    pool: SqlitePool,
}

type SessionRow = (String, String, String, i64, String, String);
type MessageRow = (String, String, String, String);

impl ArchiveRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert one session and its full log (overwrite-in-place, matching the
    /// controller's write-through model). The row update, the log wipe and
    /// the re-inserts run in one transaction, so a failure part-way through
    /// leaves the previously archived state intact.
    pub async fn save(&self, session: &Session, position: usize) -> Result<(), StorageError> {
        let context_str = context_to_str(session.context)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sessions (id, name, context, position, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, context = excluded.context, \
             position = excluded.position, updated_at = excluded.updated_at",
        )
        .bind(&session.id.0)
        .bind(&session.name)
        .bind(&context_str)
        .bind(position as i64)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(&session.id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        for (i, msg) in session.log.iter().enumerate() {
            let role_str = serde_json::to_string(&msg.role)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            sqlx::query(
                "INSERT INTO messages (id, session_id, position, role, content, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&msg.id)
            .bind(&session.id.0)
            .bind(i as i64)
            .bind(&role_str)
            .bind(&msg.content)
            .bind(msg.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    pub async fn load(&self, id: &SessionId) -> Result<Session, StorageError> {
        let row: SessionRow = sqlx::query_as(
            "SELECT id, name, context, position, created_at, updated_at \
             FROM sessions WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?
        .ok_or_else(|| StorageError::NotFound(format!("session {id}")))?;

        let log = self.load_log(&row.0).await?;
        row_to_session(row, log)
    }

    /// All archived sessions in display order.
    pub async fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, name, context, position, created_at, updated_at \
             FROM sessions ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let log = self.load_log(&row.0).await?;
            sessions.push(row_to_session(row, log)?);
        }
        Ok(sessions)
    }

    pub async fn delete(&self, id: &SessionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    /// Rewrite display positions after a delete shifted the order.
    pub async fn update_positions(&self, ids: &[SessionId]) -> Result<(), StorageError> {
        for (position, id) in ids.iter().enumerate() {
            sqlx::query("UPDATE sessions SET position = ? WHERE id = ?")
                .bind(position as i64)
                .bind(&id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Similarity stub: rank archived sessions by word overlap with the
    /// query. Not an index, just a scan; a real vector store slots in here.
    pub async fn find_similar(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Session>, StorageError> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, Session)> = self
            .load_all()
            .await?
            .into_iter()
            .filter_map(|session| {
                let text: String = session
                    .log
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let score = overlap_score(&query_tokens, &tokenize(&text));
                (score > 0.0).then_some((score, session))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(k).map(|(_, s)| s).collect())
    }

    async fn load_log(&self, session_id: &str) -> Result<Vec<Message>, StorageError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, role, content, created_at \
             FROM messages WHERE session_id = ? ORDER BY position ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_message).collect()
    }
}

fn context_to_str(context: ContextKey) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&context)
        .map_err(|e| StorageError::Serialization(e.to_string()))?
        .trim_matches('"')
        .to_string())
}

fn row_to_session(row: SessionRow, log: Vec<Message>) -> Result<Session, StorageError> {
    let context: ContextKey = serde_json::from_str(&format!("\"{}\"", row.2))
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(Session {
        id: SessionId(row.0),
        name: row.1,
        context,
        log,
        created_at: parse_timestamp(&row.4)?,
        updated_at: parse_timestamp(&row.5)?,
    })
}

fn row_to_message(row: MessageRow) -> Result<Message, StorageError> {
    let role: MessageRole = serde_json::from_str(&format!("\"{}\"", row.1))
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(Message {
        id: row.0,
        role,
        content: row.2,
        created_at: parse_timestamp(&row.3)?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{s}': {e}")))
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

fn overlap_score(query: &[String], doc: &[String]) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    let hits = query.iter().filter(|t| doc.binary_search(t).is_ok()).count();
    hits as f64 / query.len() as f64
}
