use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}

impl AppState {
    /// Build state for tests and tools that only hold an ORM connection.
    pub fn from_orm(orm: OrmConn) -> Self {
        let pool = orm.get_postgres_connection_pool().clone();
        Self { pool, orm }
    }
}
