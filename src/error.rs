/// Errors that stop a run before any message is fetched.
#[derive(Debug, thiserror::Error)]
pub enum LoginEtlError {
    #[error(transparent)]
    Envy(#[from] envy::Error),

    #[error(transparent)]
    DotEnvy(#[from] dotenvy::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("Store connection failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
