use {
    crate::{
        config::Configuration,
        model::{
            helpers::{get_user_logins, insert_user_login},
            types::{RowError, StoredUserLogin, UserLogin},
        },
        transform::FlattenedRecord,
    },
    async_trait::async_trait,
    sqlx::{
        migrate::{MigrateError, Migrator},
        postgres::PgPoolOptions,
        PgPool,
    },
    std::time::Duration,
    tracing::{info, instrument},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Store call did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Row(#[from] RowError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait LoginSink {
    /// Inserts one row in its own transaction.
    async fn insert(&self, login: &UserLogin) -> Result<(), StoreError>;
}

/// Extracts the `user_logins` columns from `record` and stores them.
pub async fn persist<K>(sink: &K, record: &FlattenedRecord) -> Result<UserLogin, PersistError>
where
    K: LoginSink + Sync + ?Sized,
{
    let login = UserLogin::try_from(record)?;
    sink.insert(&login).await?;
    Ok(login)
}

/// Postgres-backed sink holding the run's connection pool.
pub struct PostgresSink {
    postgres: PgPool,
    statement_timeout: Duration,
}

impl PostgresSink {
    pub fn new(postgres: PgPool, statement_timeout: Duration) -> Self {
        Self {
            postgres,
            statement_timeout,
        }
    }

    pub async fn connect(config: &Configuration) -> Result<Self, sqlx::Error> {
        let postgres = PgPoolOptions::new()
            .max_connections(config.store_max_connections)
            .acquire_timeout(config.store_connect_timeout)
            .connect_with(config.store_connect_options())
            .await?;
        info!(
            host = %config.store_host,
            port = config.store_port,
            db = %config.store_db,
            "Connected to store"
        );
        Ok(Self::new(postgres, config.store_statement_timeout))
    }

    /// Creates `user_logins` if needed and widens `app_version` to varchar.
    /// Already applied migrations are skipped.
    #[instrument(skip_all)]
    pub async fn ensure_schema(&self) -> Result<(), MigrateError> {
        MIGRATOR.run(&self.postgres).await?;
        info!("Store schema ready");
        Ok(())
    }

    pub async fn user_logins(&self) -> Result<Vec<StoredUserLogin>, StoreError> {
        let logins = tokio::time::timeout(self.statement_timeout, get_user_logins(&self.postgres))
            .await
            .map_err(|_| StoreError::Timeout(self.statement_timeout))??;
        Ok(logins)
    }

    pub fn postgres(&self) -> &PgPool {
        &self.postgres
    }

    pub async fn close(&self) {
        self.postgres.close().await;
    }
}

#[async_trait]
impl LoginSink for PostgresSink {
    async fn insert(&self, login: &UserLogin) -> Result<(), StoreError> {
        tokio::time::timeout(
            self.statement_timeout,
            insert_user_login(login, &self.postgres),
        )
        .await
        .map_err(|_| StoreError::Timeout(self.statement_timeout))??;
        info!(user_id = %login.user_id, "Data inserted");
        Ok(())
    }
}

#[async_trait]
impl<K> LoginSink for &K
where
    K: LoginSink + Sync + ?Sized,
{
    async fn insert(&self, login: &UserLogin) -> Result<(), StoreError> {
        (**self).insert(login).await
    }
}
