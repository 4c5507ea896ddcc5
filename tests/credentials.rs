use {
    common::{configuration, messages_response, mock_operation, scenario_login},
    login_etl::source::{FetchError, MessageSource, SqsMessageSource},
    std::{env, fs},
    wiremock::MockServer,
};

mod common;

// Mutates the process environment, so it lives in its own test binary

const CREDENTIAL_ENV_VARS: [&str; 8] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_PROFILE",
    "AWS_ROLE_ARN",
    "AWS_WEB_IDENTITY_TOKEN_FILE",
    "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI",
    "AWS_CONTAINER_CREDENTIALS_FULL_URI",
];

fn isolate_from_default_credential_chain() {
    let empty_profile = env::temp_dir().join(format!("login_etl_{:016x}", rand::random::<u64>()));
    fs::write(&empty_profile, "").unwrap();

    for var in CREDENTIAL_ENV_VARS {
        env::remove_var(var);
    }
    env::set_var("AWS_EC2_METADATA_DISABLED", "true");
    env::set_var("AWS_CONFIG_FILE", &empty_profile);
    env::set_var("AWS_SHARED_CREDENTIALS_FILE", &empty_profile);
}

#[tokio::test]
async fn test_missing_credentials() {
    isolate_from_default_credential_chain();

    let queue_server = MockServer::start().await;
    mock_operation(
        &queue_server,
        "ReceiveMessage",
        messages_response(&[scenario_login("u1")]),
    )
    .await;

    let mut config = configuration(&queue_server);
    config.aws_access_key_id = None;
    config.aws_secret_access_key = None;

    let source = SqsMessageSource::new(&config).await.unwrap();
    let result = source.fetch_batch().await;
    assert!(
        matches!(result, Err(FetchError::MissingCredentials)),
        "unexpected result: {result:?}"
    );
}
