pub mod connection;
pub mod container;
pub mod introspect;

pub use connection::PgConnection;
pub use container::{DatabaseManager, PostgresContainer};
pub use introspect::introspect_schema;
