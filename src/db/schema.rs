use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "name_search",
        sql: include_str!("migrations/002_name_search.sql"),
    },
];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = get_applied_migrations(conn)?;

    for migration in MIGRATIONS {
        if !applied.iter().any(|v| v == migration.version) {
            apply_migration(conn, migration)?;
        }
    }

    Ok(())
}

fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn mark_migration_applied(conn: &Connection, version: &str, name: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (version, name, &now),
    )?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!(
        "Applying migration {}: {}",
        migration.version,
        migration.name
    );

    conn.execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", migration.sql))
        .with_context(|| {
            format!(
                "Failed to apply migration {}: {}",
                migration.version, migration.name
            )
        })?;

    mark_migration_applied(conn, migration.version, migration.name)?;

    tracing::info!("Migration {} applied successfully", migration.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "exercises"));
        assert!(table_exists(&conn, "exercise_muscles"));
        assert!(table_exists(&conn, "exercises_fts"));

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001", "002"]);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001", "002"]);
    }

    #[test]
    fn test_lookup_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")
            .unwrap();
        let indexes = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(indexes.contains(&"idx_exercise_muscles_muscle".to_string()));
        assert!(indexes.contains(&"idx_exercises_equipment".to_string()));
    }

    #[test]
    fn test_search_index_follows_exercise_rows() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO exercises (id, name, equipment, created_at, updated_at)
             VALUES ('a', 'Barbell Curl', 'barbell', '', '')",
            [],
        )
        .unwrap();
        conn.execute("UPDATE exercises SET name = 'Hammer Curl' WHERE id = 'a'", [])
            .unwrap();

        let hits: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM exercises_fts WHERE exercises_fts MATCH 'hammer'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);

        conn.execute("DELETE FROM exercises WHERE id = 'a'", []).unwrap();
        let remaining: i32 = conn
            .query_row("SELECT COUNT(*) FROM exercises_fts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
