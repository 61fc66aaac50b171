//! SQLite-backed job registry implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{CreateJobRequest, Job, JobError, JobFilter, JobState, JobStore};

/// SQLite-backed job store.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Create a new SQLite job store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, JobError> {
        let conn = Connection::open(path).map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite job store (useful for testing).
    pub fn in_memory() -> Result<Self, JobError> {
        let conn = Connection::open_in_memory().map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), JobError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                user_id TEXT NOT NULL,
                filename TEXT NOT NULL,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_user_id ON jobs(user_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
            "#,
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &JobFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref state) = filter.state {
            // State is stored as tagged JSON; match on the "type" field.
            conditions.push("json_extract(state, '$.type') = ?");
            params.push(Box::new(state.clone()));
        }

        if let Some(ref user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(user_id.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get(0)?;
        let created_at_str: String = row.get(1)?;
        let user_id: String = row.get(2)?;
        let filename: String = row.get(3)?;
        let state_json: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        // Parse timestamps - use now if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let state: JobState = serde_json::from_str(&state_json).unwrap_or(JobState::Pending);

        Ok(Job {
            id,
            user_id,
            filename,
            state,
            created_at,
            updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, created_at, user_id, filename, state, updated_at";

impl JobStore for SqliteJobStore {
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let state = JobState::Pending;

        let state_json =
            serde_json::to_string(&state).map_err(|e| JobError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO jobs (id, created_at, user_id, filename, state, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                now.to_rfc3339(),
                request.user_id,
                request.filename,
                state_json,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(Job {
            id,
            user_id: request.user_id,
            filename: request.filename,
            state,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(JobError::Database(e.to_string())),
        }
    }

    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT {} FROM jobs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| JobError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_job)
            .map_err(|e| JobError::Database(e.to_string()))?;

        let mut jobs = Vec::new();
        for row_result in rows {
            let job = row_result.map_err(|e| JobError::Database(e.to_string()))?;
            jobs.push(job);
        }

        Ok(jobs)
    }

    fn count(&self, filter: &JobFilter) -> Result<i64, JobError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(count)
    }

    fn update_state(&self, id: &str, new_state: JobState) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let current = conn.query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_job,
        );

        let current_job = match current {
            Ok(job) => job,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(JobError::NotFound(id.to_string()));
            }
            Err(e) => return Err(JobError::Database(e.to_string())),
        };

        // Terminal states are final: Ready/Failed jobs cannot change again.
        if current_job.state.is_terminal() {
            return Err(JobError::InvalidState {
                job_id: id.to_string(),
                current_state: current_job.state.state_type().to_string(),
                operation: "transition".to_string(),
            });
        }

        let now = Utc::now();
        let state_json =
            serde_json::to_string(&new_state).map_err(|e| JobError::Database(e.to_string()))?;

        conn.execute(
            "UPDATE jobs SET state = ?, updated_at = ? WHERE id = ?",
            params![state_json, now.to_rfc3339(), id],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(Job {
            state: new_state,
            updated_at: now,
            ..current_job
        })
    }
}
