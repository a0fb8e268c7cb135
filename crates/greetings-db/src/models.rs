//! Database row types. Kept apart from the wire types in greetings-types so
//! the password hash cannot leak into a response by accident.

#[derive(Debug, Clone)]
pub struct GreetingRow {
    pub id: i64,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}
