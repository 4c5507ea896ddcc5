use {
    super::{Configuration, MAX_QUEUE_BATCH_SIZE},
    crate::error::LoginEtlError,
    dotenvy::dotenv,
    serde::Deserialize,
    std::time::Duration,
    url::Url,
};

// Configuration entrypoint for `cargo run` against LocalStack and a local Postgres

#[derive(Deserialize, Debug)]
pub struct LocalConfiguration {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_queue_region")]
    pub queue_region: String,
    /// Defaults to [`DEFAULT_QUEUE_ENDPOINT`]
    pub queue_endpoint: Option<Url>,
    /// Defaults to [`DEFAULT_QUEUE_URL`]
    pub queue_url: Option<Url>,
    #[serde(default = "default_dummy_credential")]
    pub aws_access_key_id: String,
    #[serde(default = "default_dummy_credential")]
    pub aws_secret_access_key: String,
    #[serde(default = "default_queue_max_messages")]
    pub queue_max_messages: i32,
    #[serde(default = "default_queue_visibility_timeout_secs")]
    pub queue_visibility_timeout_secs: u64,
    #[serde(default = "default_queue_wait_time_secs")]
    pub queue_wait_time_secs: u64,
    #[serde(default = "default_true")]
    pub queue_delete_processed: bool,

    #[serde(default = "default_store_host")]
    pub store_host: String,
    #[serde(default = "default_store_port")]
    pub store_port: u16,
    #[serde(default = "default_postgres")]
    pub store_db: String,
    #[serde(default = "default_postgres")]
    pub store_user: String,
    #[serde(default = "default_postgres")]
    pub store_password: String,
    #[serde(default = "default_store_max_connections")]
    pub store_max_connections: u32,
    #[serde(default = "default_store_timeout_secs")]
    pub store_connect_timeout_secs: u64,
    #[serde(default = "default_store_timeout_secs")]
    pub store_statement_timeout_secs: u64,
    pub store_max_consecutive_failures: Option<u32>,

    #[serde(default = "default_true")]
    pub dump_table: bool,
}

fn default_log_level() -> String {
    "WARN,login_etl=DEBUG".to_string()
}

fn default_queue_region() -> String {
    "us-east-1".to_owned()
}

pub const DEFAULT_QUEUE_ENDPOINT: &str = "http://localhost:4566/";
pub const DEFAULT_QUEUE_URL: &str = "http://localhost:4566/000000000000/login-queue";

fn default_dummy_credential() -> String {
    "dummy".to_owned()
}

pub fn default_queue_max_messages() -> i32 {
    MAX_QUEUE_BATCH_SIZE
}

pub fn default_queue_visibility_timeout_secs() -> u64 {
    30
}

pub fn default_queue_wait_time_secs() -> u64 {
    20
}

pub fn default_true() -> bool {
    true
}

fn default_store_host() -> String {
    "localhost".to_owned()
}

pub fn default_store_port() -> u16 {
    5432
}

fn default_postgres() -> String {
    "postgres".to_owned()
}

pub fn default_store_max_connections() -> u32 {
    1
}

pub fn default_store_timeout_secs() -> u64 {
    10
}

pub fn get_configuration() -> Result<Configuration, LoginEtlError> {
    load_dot_env()?;
    envy::from_env::<LocalConfiguration>()?.try_into()
}

fn url_or_default(url: Option<Url>, default: &str) -> Result<Url, url::ParseError> {
    url.map_or_else(|| Url::parse(default), Ok)
}

impl TryFrom<LocalConfiguration> for Configuration {
    type Error = LoginEtlError;

    fn try_from(config: LocalConfiguration) -> Result<Self, Self::Error> {
        Ok(Self {
            log_level: config.log_level,
            queue_region: config.queue_region,
            queue_endpoint: Some(url_or_default(config.queue_endpoint, DEFAULT_QUEUE_ENDPOINT)?),
            queue_url: url_or_default(config.queue_url, DEFAULT_QUEUE_URL)?,
            aws_access_key_id: Some(config.aws_access_key_id),
            aws_secret_access_key: Some(config.aws_secret_access_key),
            queue_max_messages: config.queue_max_messages,
            queue_visibility_timeout: Duration::from_secs(config.queue_visibility_timeout_secs),
            queue_wait_time: Duration::from_secs(config.queue_wait_time_secs),
            queue_delete_processed: config.queue_delete_processed,
            store_host: config.store_host,
            store_port: config.store_port,
            store_db: config.store_db,
            store_user: config.store_user,
            store_password: config.store_password,
            store_max_connections: config.store_max_connections,
            store_connect_timeout: Duration::from_secs(config.store_connect_timeout_secs),
            store_statement_timeout: Duration::from_secs(config.store_statement_timeout_secs),
            store_max_consecutive_failures: config.store_max_consecutive_failures,
            dump_table: config.dump_table,
        })
    }
}

fn load_dot_env() -> dotenvy::Result<()> {
    match dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn configuration(pairs: &[(&str, &str)]) -> Configuration {
        envy::from_iter::<_, LocalConfiguration>(vars(pairs))
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn defaults_point_at_localstack() {
        let config = configuration(&[]);
        assert_eq!(config.queue_region, "us-east-1");
        assert_eq!(
            config.queue_endpoint.as_ref().map(Url::as_str),
            Some("http://localhost:4566/")
        );
        assert_eq!(
            config.queue_url.as_str(),
            "http://localhost:4566/000000000000/login-queue"
        );
        assert_eq!(config.aws_access_key_id.as_deref(), Some("dummy"));
        assert_eq!(config.aws_secret_access_key.as_deref(), Some("dummy"));
        assert_eq!(config.queue_max_messages, 10);
        assert_eq!(config.queue_visibility_timeout, Duration::from_secs(30));
        assert_eq!(config.queue_wait_time, Duration::from_secs(20));
        assert_eq!(config.store_host, "localhost");
        assert_eq!(config.store_port, 5432);
        assert_eq!(config.store_db, "postgres");
        assert_eq!(config.store_max_consecutive_failures, None);
        assert!(config.dump_table);
    }

    #[test]
    fn queue_urls_can_be_overridden() {
        let config = configuration(&[
            ("QUEUE_ENDPOINT", "http://sqs.local:9324/"),
            ("QUEUE_URL", "http://sqs.local:9324/queue/logins"),
        ]);
        assert_eq!(
            config.queue_endpoint.as_ref().map(Url::as_str),
            Some("http://sqs.local:9324/")
        );
        assert_eq!(config.queue_url.as_str(), "http://sqs.local:9324/queue/logins");
    }

    #[test]
    fn overrides_from_env() {
        let config = envy::from_iter::<_, LocalConfiguration>(vars(&[
            ("STORE_PORT", "6543"),
            ("QUEUE_WAIT_TIME_SECS", "0"),
            ("STORE_MAX_CONSECUTIVE_FAILURES", "3"),
            ("DUMP_TABLE", "false"),
        ]))
        .unwrap();
        assert_eq!(config.store_port, 6543);
        assert_eq!(config.queue_wait_time_secs, 0);
        assert_eq!(config.store_max_consecutive_failures, Some(3));
        assert!(!config.dump_table);
    }
}
