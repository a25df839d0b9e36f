use libsql::{Connection, Database};
use plano_core::error::{PlanoError, Result};
use plano_core::types::*;

fn db_err(e: libsql::Error) -> PlanoError {
    PlanoError::Database(e.to_string())
}

/// Read a nullable TEXT column as Option<String>.
fn get_optional_string(row: &libsql::Row, idx: i32) -> Result<Option<String>> {
    let val = row.get::<libsql::Value>(idx).map_err(db_err)?;
    match val {
        libsql::Value::Null => Ok(None),
        libsql::Value::Text(s) => Ok(Some(s)),
        other => Err(PlanoError::Database(format!(
            "expected text or null at column {idx}, got: {other:?}"
        ))),
    }
}

/// Parse a stored reminder_times column (JSON array of "HH:00" strings).
/// NULL or unparseable values mean "use the defaults".
fn parse_reminder_times(raw: Option<String>) -> Option<Vec<String>> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(&s).ok())
}

/// Document-database access for user state and the message log.
///
/// Everything except `user_messages` is authored elsewhere — plans and
/// profiles are read here, never written.
pub struct Store {
    db: Database,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a fresh database connection.
    fn conn(&self) -> Result<Connection> {
        self.db.connect().map_err(db_err)
    }

    /// Create the tables this service reads and writes.
    pub async fn init(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_profiles (
                chat_id TEXT PRIMARY KEY,
                reminder_times TEXT
            )",
            (),
        )
        .await
        .map_err(db_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pending_plans (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL,
                goal TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(db_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS approved_plans (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL,
                goal TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(db_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_messages (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(db_err)?;

        Ok(())
    }

    /// Lightweight liveness check used by the keep-alive job.
    pub async fn ping(&self) -> Result<()> {
        let mut rows = self.conn()?.query("SELECT 1", ()).await.map_err(db_err)?;
        rows.next().await.map_err(db_err)?;
        Ok(())
    }

    /// Append an inbound message to the log.
    pub async fn log_message(&self, chat_id: &str, message: &str) -> Result<()> {
        let id = new_id();
        let now = now_unix();

        self.conn()?
            .execute(
                "INSERT INTO user_messages (id, chat_id, message, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id, chat_id.to_string(), message.to_string(), now],
            )
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// List every user profile.
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let mut profiles = Vec::new();
        let conn = self.conn()?;

        let mut rows = conn
            .query("SELECT chat_id, reminder_times FROM user_profiles", ())
            .await
            .map_err(db_err)?;

        while let Some(row) = rows.next().await.map_err(db_err)? {
            profiles.push(UserProfile {
                chat_id: row.get::<String>(0).map_err(db_err)?,
                reminder_times: parse_reminder_times(get_optional_string(&row, 1)?),
            });
        }

        Ok(profiles)
    }

    /// Pending plans for one chat, oldest first, at most `limit`.
    pub async fn pending_plans(&self, chat_id: &str, limit: usize) -> Result<Vec<Plan>> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT id, chat_id, goal, status, created_at FROM pending_plans
                 WHERE chat_id = ?1 AND status = 'pending' LIMIT ?2",
                libsql::params![chat_id.to_string(), limit as i64],
            )
            .await
            .map_err(db_err)?;

        Self::collect_plans(&mut rows).await
    }

    /// Most recently created approved plans for one chat, newest first.
    pub async fn recent_approved_plans(&self, chat_id: &str, limit: usize) -> Result<Vec<Plan>> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT id, chat_id, goal, status, created_at FROM approved_plans
                 WHERE chat_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                libsql::params![chat_id.to_string(), limit as i64],
            )
            .await
            .map_err(db_err)?;

        Self::collect_plans(&mut rows).await
    }

    /// Approved plans that are not yet completed, at most `limit`.
    pub async fn active_approved_plans(&self, chat_id: &str, limit: usize) -> Result<Vec<Plan>> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT id, chat_id, goal, status, created_at FROM approved_plans
                 WHERE chat_id = ?1 AND status != 'completed' LIMIT ?2",
                libsql::params![chat_id.to_string(), limit as i64],
            )
            .await
            .map_err(db_err)?;

        Self::collect_plans(&mut rows).await
    }

    async fn collect_plans(rows: &mut libsql::Rows) -> Result<Vec<Plan>> {
        let mut plans = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            plans.push(Plan {
                id: row.get::<String>(0).map_err(db_err)?,
                chat_id: row.get::<String>(1).map_err(db_err)?,
                goal: row.get::<String>(2).map_err(db_err)?,
                status: row.get::<String>(3).map_err(db_err)?,
                created_at: row.get::<i64>(4).map_err(db_err)?,
            });
        }
        Ok(plans)
    }
}
