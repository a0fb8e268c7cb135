use crate::models::{GreetingRow, UserRow};
use crate::{Database, DbError};
use rusqlite::{OptionalExtension, Row};

impl Database {
    pub fn ping(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    // -- Greetings --

    pub fn list_greetings(&self) -> Result<Vec<GreetingRow>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, message FROM greetings ORDER BY id")?;
            let rows = stmt
                .query_map([], greeting_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_greeting(&self, id: i64) -> Result<Option<GreetingRow>, DbError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, message FROM greetings WHERE id = ?1",
                    [id],
                    greeting_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_greeting(&self, title: &str, message: &str) -> Result<GreetingRow, DbError> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO greetings (title, message) VALUES (?1, ?2) RETURNING id, title, message",
                (title, message),
                greeting_from_row,
            )?;
            Ok(row)
        })
    }

    /// Replaces title and message. `None` when no greeting has this id.
    pub fn update_greeting(
        &self,
        id: i64,
        title: &str,
        message: &str,
    ) -> Result<Option<GreetingRow>, DbError> {
        self.with_conn_mut(|conn| {
            let row = conn
                .query_row(
                    "UPDATE greetings SET title = ?1, message = ?2 WHERE id = ?3 RETURNING id, title, message",
                    rusqlite::params![title, message, id],
                    greeting_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_greeting(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM greetings WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Users --

    /// Inserts a user. A taken email fails with [`DbError::UniqueViolation`].
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, DbError> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO users (name, email, password) VALUES (?1, ?2, ?3)
                 RETURNING id, name, email, password",
                (name, email, password_hash),
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, password FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, password FROM users WHERE email = ?1",
                    [email],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, email, password FROM users ORDER BY id")?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full replace of a user's fields. `None` when no user has this id.
    pub fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserRow>, DbError> {
        self.with_conn_mut(|conn| {
            let row = conn
                .query_row(
                    "UPDATE users SET name = ?1, email = ?2, password = ?3 WHERE id = ?4
                     RETURNING id, name, email, password",
                    rusqlite::params![name, email, password_hash, id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn greeting_from_row(row: &Row<'_>) -> rusqlite::Result<GreetingRow> {
    Ok(GreetingRow {
        id: row.get(0)?,
        title: row.get(1)?,
        message: row.get(2)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn greeting_crud() {
        let db = db();
        assert!(db.list_greetings().unwrap().is_empty());

        let created = db.create_greeting("Hi", "There").unwrap();
        assert!(created.id > 0);

        let fetched = db.get_greeting(created.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Hi");
        assert_eq!(fetched.message, "There");

        let updated = db.update_greeting(created.id, "Hello", "World").unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Hello");

        assert!(db.delete_greeting(created.id).unwrap());
        assert!(!db.delete_greeting(created.id).unwrap());
        assert!(db.get_greeting(created.id).unwrap().is_none());
        assert!(db.update_greeting(created.id, "a", "b").unwrap().is_none());
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let db = db();
        let first = db.create_greeting("a", "b").unwrap();
        db.delete_greeting(first.id).unwrap();
        let second = db.create_greeting("c", "d").unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn duplicate_email_is_a_unique_violation() {
        let db = db();
        db.create_user("Ann", "ann@example.com", "hash").unwrap();

        let err = db.create_user("Other", "ann@example.com", "hash").unwrap_err();
        assert!(err.is_unique_violation(), "got {err:?}");
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn update_user_into_taken_email_conflicts() {
        let db = db();
        db.create_user("Ann", "ann@example.com", "h1").unwrap();
        let bob = db.create_user("Bob", "bob@example.com", "h2").unwrap();

        let err = db
            .update_user(bob.id, "Bob", "ann@example.com", "h2")
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert!(db.update_user(999, "x", "x@example.com", "h").unwrap().is_none());
    }

    #[test]
    fn user_lookup_by_email_and_id() {
        let db = db();
        let ann = db.create_user("Ann", "ann@example.com", "hash").unwrap();

        let by_email = db.get_user_by_email("ann@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, ann.id);
        assert_eq!(by_email.password, "hash");
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());

        assert!(db.delete_user(ann.id).unwrap());
        assert!(db.get_user_by_id(ann.id).unwrap().is_none());
    }

    #[test]
    fn ping_succeeds() {
        db().ping().unwrap();
    }
}
