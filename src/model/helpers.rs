use {
    super::types::{StoredUserLogin, UserLogin},
    sqlx::{PgPool, Postgres},
    tracing::instrument,
};

#[instrument(skip_all, fields(user_id = %login.user_id))]
pub async fn insert_user_login(
    login: &UserLogin,
    postgres: &PgPool,
) -> Result<(), sqlx::error::Error> {
    let query = "
        INSERT INTO user_logins (
            user_id,
            device_type,
            masked_ip,
            masked_device_id,
            locale,
            app_version,
            create_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    ";
    let mut txn = postgres.begin().await?;
    sqlx::query::<Postgres>(query)
        .bind(&login.user_id)
        .bind(&login.device_type)
        .bind(&login.masked_ip)
        .bind(&login.masked_device_id)
        .bind(&login.locale)
        .bind(&login.app_version)
        .bind(login.create_date)
        .execute(&mut *txn)
        .await?;
    // An early return above drops `txn`, which rolls it back
    txn.commit().await
}

#[instrument(skip(postgres))]
pub async fn get_user_logins(
    postgres: &PgPool,
) -> Result<Vec<StoredUserLogin>, sqlx::error::Error> {
    let query = "
        SELECT user_id, device_type, masked_ip, masked_device_id, locale, app_version, create_date
        FROM user_logins
    ";
    sqlx::query_as::<Postgres, StoredUserLogin>(query)
        .fetch_all(postgres)
        .await
}
