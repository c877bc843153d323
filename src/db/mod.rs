//! SQLite-backed exercise store.
//!
//! [`Database`] owns record identity and persistence. The HTTP layer only
//! reads through it; inserts come from the ingestion path in [`seed`].

mod filter;
mod schema;
pub mod seed;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

use crate::models::*;

use filter::build_where;

const EXERCISE_COLUMNS: &str = "e.id, e.name, e.equipment, e.category, e.force, e.level, e.mechanic,
     e.instructions, e.images, e.created_at, e.updated_at";

/// A field whose distinct stored values can be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctField {
    Equipment,
    /// Only muscles listed as primary targets; secondary-only tags are not
    /// included.
    PrimaryMuscles,
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "exercise-catalog")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("exercises.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        schema::run_migrations(&conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Exercises matching `filter`, sorted by name ascending, skipping `skip`
    /// records and returning at most `limit`. Ties on name are broken by id
    /// so repeated calls page identically.
    pub fn find(&self, filter: &ExerciseFilter, skip: u64, limit: u64) -> Result<Vec<Exercise>> {
        let conn = self.conn()?;
        let clause = build_where(filter);
        let sql = format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises e WHERE {}
             ORDER BY e.name, e.id LIMIT ? OFFSET ?",
            clause.sql
        );

        let mut params = clause.params;
        params.push(to_sql_int(limit).into());
        params.push(to_sql_int(skip).into());

        query_exercises(&conn, &sql, params).context("Failed to query exercises")
    }

    /// Total number of exercises matching `filter`, ignoring pagination.
    pub fn count(&self, filter: &ExerciseFilter) -> Result<u64> {
        let conn = self.conn()?;
        let clause = build_where(filter);
        let sql = format!("SELECT COUNT(*) FROM exercises e WHERE {}", clause.sql);

        let total: i64 = conn
            .query_row(&sql, params_from_iter(clause.params.iter()), |row| row.get(0))
            .context("Failed to count exercises")?;
        Ok(total.max(0) as u64)
    }

    /// Up to `count` exercises matching `filter` in random order.
    ///
    /// A single call never returns the same record twice. Successive calls
    /// draw independently.
    pub fn sample(&self, filter: &ExerciseFilter, count: u64) -> Result<Vec<Exercise>> {
        let conn = self.conn()?;
        let clause = build_where(filter);
        let sql = format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises e WHERE {}
             ORDER BY random() LIMIT ?",
            clause.sql
        );

        let mut params = clause.params;
        params.push(to_sql_int(count).into());

        query_exercises(&conn, &sql, params).context("Failed to sample exercises")
    }

    /// Look up one exercise. Identifiers that are not well-formed resolve to
    /// `None` like any other unknown id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Exercise>> {
        let Ok(id) = Uuid::parse_str(id) else {
            tracing::debug!("Ignoring malformed exercise id {:?}", id);
            return Ok(None);
        };

        let conn = self.conn()?;
        let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises e WHERE e.id = ?");
        let mut found = query_exercises(&conn, &sql, vec![id.to_string().into()])
            .context("Failed to fetch exercise")?;
        Ok(found.pop())
    }

    /// All unique stored values of `field`, sorted ascending by byte order.
    pub fn distinct_values(&self, field: DistinctField) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let sql = match field {
            DistinctField::Equipment => {
                "SELECT DISTINCT equipment FROM exercises ORDER BY equipment"
            }
            DistinctField::PrimaryMuscles => {
                "SELECT DISTINCT muscle FROM exercise_muscles WHERE role = 'primary' ORDER BY muscle"
            }
        };

        let mut stmt = conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .with_context(|| format!("Failed to list distinct {:?} values", field))?;
        Ok(values)
    }

    /// Exercises whose name contains words starting with each word of `text`,
    /// sorted by name.
    pub fn search_names(&self, text: &str, limit: u64) -> Result<Vec<Exercise>> {
        self.find(&ExerciseFilter::default().with_search(text), 0, limit)
    }

    // ============================================================
    // Ingestion
    // ============================================================

    /// Validate and store a new exercise, assigning its id and timestamps.
    pub fn insert_exercise(&self, input: NewExercise) -> Result<Exercise> {
        input.validate()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let name = input.name.trim().to_string();
        let category = input.category_or_default().to_string();

        tx.execute(
            "INSERT INTO exercises (id, name, equipment, category, force, level, mechanic,
                                    instructions, images, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id.to_string(),
                &name,
                input.equipment.as_str(),
                &category,
                input.force.map(|f| f.as_str()),
                input.level.map(|l| l.as_str()),
                input.mechanic.map(|m| m.as_str()),
                serde_json::to_string(&input.instructions)?,
                serde_json::to_string(&input.images)?,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO exercise_muscles (exercise_id, muscle, role, position) VALUES (?, ?, ?, ?)",
            )?;
            for (role, muscles) in [
                (MuscleRole::Primary, &input.primary_muscles),
                (MuscleRole::Secondary, &input.secondary_muscles),
            ] {
                for (position, muscle) in muscles.iter().enumerate() {
                    stmt.execute((id.to_string(), muscle.as_str(), role.as_str(), position as i64))?;
                }
            }
        }

        tx.commit()?;

        Ok(Exercise {
            id,
            name,
            primary_muscles: input.primary_muscles,
            secondary_muscles: input.secondary_muscles,
            equipment: input.equipment,
            instructions: input.instructions,
            images: input.images,
            category,
            force: input.force,
            level: input.level,
            mechanic: input.mechanic,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn query_exercises(
    conn: &Connection,
    sql: &str,
    params: Vec<rusqlite::types::Value>,
) -> Result<Vec<Exercise>> {
    let mut stmt = conn.prepare(sql)?;
    let mut exercises = stmt
        .query_map(params_from_iter(params.iter()), exercise_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for exercise in &mut exercises {
        attach_muscles(conn, exercise)?;
    }

    Ok(exercises)
}

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        primary_muscles: Vec::new(),
        secondary_muscles: Vec::new(),
        equipment: Equipment::new(row.get::<_, String>(2)?),
        category: row.get(3)?,
        force: row.get::<_, Option<String>>(4)?.and_then(|s| Force::from_str(&s)),
        level: row.get::<_, Option<String>>(5)?.and_then(|s| Level::from_str(&s)),
        mechanic: row.get::<_, Option<String>>(6)?.and_then(|s| Mechanic::from_str(&s)),
        instructions: parse_string_list(row.get::<_, Option<String>>(7)?),
        images: parse_string_list(row.get::<_, Option<String>>(8)?),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn attach_muscles(conn: &Connection, exercise: &mut Exercise) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT muscle, role FROM exercise_muscles WHERE exercise_id = ? ORDER BY role, position",
    )?;
    let rows = stmt
        .query_map([exercise.id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (tag, role) in rows {
        let Some(muscle) = Muscle::from_str(&tag) else {
            tracing::warn!("Exercise {} has unknown muscle tag {:?}", exercise.id, tag);
            continue;
        };
        match MuscleRole::from_str(&role) {
            Some(MuscleRole::Primary) => exercise.primary_muscles.push(muscle),
            Some(MuscleRole::Secondary) => exercise.secondary_muscles.push(muscle),
            None => tracing::warn!("Exercise {} has unknown muscle role {:?}", exercise.id, role),
        }
    }

    Ok(())
}

/// SQLite integers are signed; anything past `i64::MAX` means "no bound".
fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn parse_string_list(s: Option<String>) -> Vec<String> {
    s.and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stored_values_are_tolerated_on_read() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        let id = Uuid::new_v4().to_string();

        {
            let conn = db.conn().unwrap();
            conn.execute(
                "INSERT INTO exercises (id, name, equipment, force, level, instructions, images, created_at, updated_at)
                 VALUES (?, 'Odd Lift', 'sandbag', 'twist', 'legendary', 'not json', '[\"a.jpg\"]', 'yesterday', 'yesterday')",
                [&id],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO exercise_muscles (exercise_id, muscle, role, position)
                 VALUES (?1, 'wings', 'primary', 0), (?1, 'chest', 'primary', 1), (?1, 'neck', 'secondary', 0)",
                [&id],
            )
            .unwrap();
        }

        let exercise = db.find_by_id(&id).unwrap().unwrap();
        assert_eq!(exercise.primary_muscles, vec![Muscle::Chest]);
        assert_eq!(exercise.secondary_muscles, vec![Muscle::Neck]);
        assert!(exercise.force.is_none());
        assert!(exercise.level.is_none());
        assert!(exercise.instructions.is_empty());
        assert_eq!(exercise.images, vec!["a.jpg".to_string()]);
        assert_eq!(exercise.created_at, chrono::DateTime::<Utc>::default());
    }

    #[test]
    fn huge_limits_do_not_overflow() {
        assert_eq!(to_sql_int(u64::MAX), i64::MAX);
        assert_eq!(to_sql_int(50), 50);
    }
}
