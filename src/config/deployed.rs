use {
    super::{
        local::{
            default_queue_max_messages, default_queue_visibility_timeout_secs,
            default_queue_wait_time_secs, default_store_max_connections,
            default_store_port, default_store_timeout_secs, default_true,
        },
        Configuration,
    },
    crate::error::LoginEtlError,
    serde::Deserialize,
    std::time::Duration,
    url::Url,
};

// Configuration entrypoint for a deployed service

#[derive(Deserialize, Debug)]
pub struct DeployedConfiguration {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub queue_region: String,
    pub queue_endpoint: Option<Url>,
    pub queue_url: Url,
    /// Both unset means the AWS default credential chain is used
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    #[serde(default = "default_queue_max_messages")]
    pub queue_max_messages: i32,
    #[serde(default = "default_queue_visibility_timeout_secs")]
    pub queue_visibility_timeout_secs: u64,
    #[serde(default = "default_queue_wait_time_secs")]
    pub queue_wait_time_secs: u64,
    #[serde(default = "default_true")]
    pub queue_delete_processed: bool,

    pub store_host: String,
    #[serde(default = "default_store_port")]
    pub store_port: u16,
    pub store_db: String,
    pub store_user: String,
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
    "WARN,login_etl=INFO".to_string()
}

pub fn get_configuration() -> Result<Configuration, LoginEtlError> {
    Ok(envy::from_env::<DeployedConfiguration>()?.into())
}

impl From<DeployedConfiguration> for Configuration {
    fn from(config: DeployedConfiguration) -> Self {
        Self {
            log_level: config.log_level,
            queue_region: config.queue_region,
            queue_endpoint: config.queue_endpoint,
            queue_url: config.queue_url,
            aws_access_key_id: config.aws_access_key_id,
            aws_secret_access_key: config.aws_secret_access_key,
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
        }
    }
}
