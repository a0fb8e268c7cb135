use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Ordered schema steps. Each runs once, inside its own transaction, and is
/// recorded in `schema_version`.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "
    CREATE TABLE IF NOT EXISTS greetings (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        message     TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL
    );
    ",
)];

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    for &(target, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > version) {
        info!("Running migration v{}", target);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [target])?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", current_version(conn)?);
    Ok(())
}
