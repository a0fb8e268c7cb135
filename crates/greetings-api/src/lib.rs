pub mod error;
pub mod greetings;
pub mod health;
pub mod password;
pub mod routes;
pub mod state;
pub mod users;

pub use routes::router;
pub use state::{AppState, AppStateInner};
