use crate::migrations::Migration;
use crate::pg::connection::PgConnection;
use crate::util::{sanitize_url, Result, SchemaError};
use async_trait::async_trait;
use sqlx::{Pool, Postgres as PgDriver};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::{debug, info};

pub const DEFAULT_POSTGRES_IMAGE: &str = "postgres:16-alpine";
pub const DATABASE_NAME: &str = "testdb";
pub const DATABASE_USER: &str = "testuser";
pub const DATABASE_PASSWORD: &str = "testpass";

/// Lifecycle of the database the migrations are applied to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Provisions the database and opens a connection to it.
    async fn setup(&mut self) -> Result<()>;
    /// Releases the connection and tears the database down.
    async fn close(&mut self) -> Result<()>;
    /// Executes each migration's up file, in order.
    async fn run_migrations(&self, migrations: &[Migration]) -> Result<()>;
    /// Connection pool, once set up.
    fn pool(&self) -> Option<Pool<PgDriver>>;
    /// Connection URL, once set up.
    fn connection_string(&self) -> Option<String>;
}

/// Throwaway PostgreSQL running in a container.
pub struct PostgresContainer {
    image: String,
    container: Option<ContainerAsync<Postgres>>,
    connection: Option<PgConnection>,
    connection_string: Option<String>,
}

impl PostgresContainer {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            container: None,
            connection: None,
            connection_string: None,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

impl Default for PostgresContainer {
    fn default() -> Self {
        Self::new(DEFAULT_POSTGRES_IMAGE)
    }
}

/// Splits `name[:tag]`, keeping registry ports (`host:5000/postgres`) intact.
pub fn split_image(image: &str) -> (&str, &str) {
    let last_segment = image.rsplit('/').next().unwrap_or(image);
    match last_segment.rfind(':') {
        Some(pos) => {
            let split_at = image.len() - last_segment.len() + pos;
            (&image[..split_at], &image[split_at + 1..])
        }
        None => (image, "latest"),
    }
}

#[async_trait]
impl DatabaseManager for PostgresContainer {
    async fn setup(&mut self) -> Result<()> {
        let (name, tag) = split_image(&self.image);
        debug!(image = %self.image, "starting postgresql container");

        let container = Postgres::default()
            .with_db_name(DATABASE_NAME)
            .with_user(DATABASE_USER)
            .with_password(DATABASE_PASSWORD)
            .with_name(name)
            .with_tag(tag)
            .start()
            .await
            .map_err(|e| SchemaError::DatabaseError(format!("failed to start container: {e}")))?;

        let host = container.get_host().await.map_err(|e| {
            SchemaError::DatabaseError(format!("failed to get container host: {e}"))
        })?;
        let port = container.get_host_port_ipv4(5432).await.map_err(|e| {
            SchemaError::DatabaseError(format!("failed to get container port: {e}"))
        })?;

        let url = format!(
            "postgres://{DATABASE_USER}:{DATABASE_PASSWORD}@{host}:{port}/{DATABASE_NAME}?sslmode=disable"
        );
        debug!(url = %sanitize_url(&url), "got database connection string");

        // Keep the container handle even if connecting fails so close() can
        // still tear it down.
        self.container = Some(container);
        let connection = PgConnection::new(&url).await?;

        self.connection = Some(connection);
        self.connection_string = Some(url);
        info!(image = %self.image, "postgresql container ready");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
        }
        self.connection_string = None;

        if let Some(container) = self.container.take() {
            container.stop().await.map_err(|e| {
                SchemaError::DatabaseError(format!("failed to stop container: {e}"))
            })?;
            debug!("postgresql container stopped");
        }
        Ok(())
    }

    async fn run_migrations(&self, migrations: &[Migration]) -> Result<()> {
        let connection = self.connection.as_ref().ok_or_else(|| {
            SchemaError::DatabaseError("database has not been set up".to_string())
        })?;
        apply_migrations(connection, migrations).await
    }

    fn pool(&self) -> Option<Pool<PgDriver>> {
        self.connection.as_ref().map(|c| c.pool().clone())
    }

    fn connection_string(&self) -> Option<String> {
        self.connection_string.clone()
    }
}

/// Executes the up file of every migration as one raw SQL batch each.
pub async fn apply_migrations(connection: &PgConnection, migrations: &[Migration]) -> Result<()> {
    for migration in migrations {
        info!(name = %migration.name, file = %migration.up_path.display(), "running migration");

        let content = tokio::fs::read_to_string(&migration.up_path)
            .await
            .map_err(|e| {
                SchemaError::MigrationError(format!(
                    "failed to read migration file {}: {e}",
                    migration.up_path.display()
                ))
            })?;

        sqlx::raw_sql(&content)
            .execute(connection.pool())
            .await
            .map_err(|e| {
                SchemaError::MigrationError(format!(
                    "failed to execute migration {}: {e}",
                    migration.name
                ))
            })?;

        debug!(name = %migration.name, "migration completed successfully");
    }

    info!(count = migrations.len(), "all migrations completed successfully");
    Ok(())
}
