use {
    crate::error::LoginEtlError,
    sqlx::postgres::PgConnectOptions,
    std::{env, time::Duration},
    url::Url,
};

mod deployed;
mod local;

/// SQS never returns more than this many messages per receive call.
pub const MAX_QUEUE_BATCH_SIZE: i32 = 10;

#[derive(Debug, Clone)]
pub struct Configuration {
    pub log_level: String,

    // QUEUE
    pub queue_region: String,
    /// Endpoint override, e.g. LocalStack at http://localhost:4566/
    pub queue_endpoint: Option<Url>,
    pub queue_url: Url,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub queue_max_messages: i32,
    pub queue_visibility_timeout: Duration,
    /// Long-poll wait of a single receive call
    pub queue_wait_time: Duration,
    /// Delete messages from the queue once they are stored or rejected
    pub queue_delete_processed: bool,

    // STORE
    pub store_host: String,
    pub store_port: u16,
    pub store_db: String,
    pub store_user: String,
    pub store_password: String,
    pub store_max_connections: u32,
    pub store_connect_timeout: Duration,
    pub store_statement_timeout: Duration,
    /// Stop draining the batch after this many persistence failures in a row, 0 disables
    pub store_max_consecutive_failures: Option<u32>,

    /// Print the `user_logins` table after the run
    pub dump_table: bool,
}

impl Configuration {
    pub fn store_connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.store_host)
            .port(self.store_port)
            .database(&self.store_db)
            .username(&self.store_user)
            .password(&self.store_password)
    }

    pub fn queue_max_messages(&self) -> i32 {
        self.queue_max_messages.clamp(1, MAX_QUEUE_BATCH_SIZE)
    }
}

pub async fn get_configuration() -> Result<Configuration, LoginEtlError> {
    if env::var("ENVIRONMENT") == Ok("DEPLOYED".to_owned()) {
        deployed::get_configuration()
    } else {
        local::get_configuration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_configuration() -> Configuration {
        Configuration {
            log_level: "WARN,login_etl=DEBUG".to_owned(),
            queue_region: "us-east-1".to_owned(),
            queue_endpoint: None,
            queue_url: "http://localhost:4566/000000000000/login-queue"
                .parse()
                .unwrap(),
            aws_access_key_id: Some("dummy".to_owned()),
            aws_secret_access_key: Some("dummy".to_owned()),
            queue_max_messages: MAX_QUEUE_BATCH_SIZE,
            queue_visibility_timeout: Duration::from_secs(30),
            queue_wait_time: Duration::from_secs(20),
            queue_delete_processed: true,
            store_host: "localhost".to_owned(),
            store_port: 5432,
            store_db: "postgres".to_owned(),
            store_user: "postgres".to_owned(),
            store_password: "postgres".to_owned(),
            store_max_connections: 1,
            store_connect_timeout: Duration::from_secs(10),
            store_statement_timeout: Duration::from_secs(10),
            store_max_consecutive_failures: None,
            dump_table: true,
        }
    }

    #[test]
    fn queue_max_messages_is_clamped() {
        let mut config = test_configuration();
        config.queue_max_messages = 50;
        assert_eq!(config.queue_max_messages(), MAX_QUEUE_BATCH_SIZE);
        config.queue_max_messages = 0;
        assert_eq!(config.queue_max_messages(), 1);
        config.queue_max_messages = 4;
        assert_eq!(config.queue_max_messages(), 4);
    }
}
