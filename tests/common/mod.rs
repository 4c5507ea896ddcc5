#![allow(dead_code)]

use {
    login_etl::config::Configuration,
    serde_json::{json, Value},
    std::time::Duration,
    url::Url,
    wiremock::{
        matchers::{header, method},
        Mock, MockServer, ResponseTemplate,
    },
};

pub const AWS_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";

pub fn configuration(queue_server: &MockServer) -> Configuration {
    let endpoint = queue_server.uri().parse::<Url>().unwrap();
    Configuration {
        log_level: "WARN,login_etl=DEBUG".to_owned(),
        queue_region: "us-east-1".to_owned(),
        queue_url: endpoint.join("/000000000000/login-queue").unwrap(),
        queue_endpoint: Some(endpoint),
        aws_access_key_id: Some("dummy".to_owned()),
        aws_secret_access_key: Some("dummy".to_owned()),
        queue_max_messages: 10,
        queue_visibility_timeout: Duration::from_secs(30),
        queue_wait_time: Duration::ZERO,
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
        dump_table: false,
    }
}

/// Mounts a response for one SQS JSON-protocol operation, e.g. `ReceiveMessage`.
pub async fn mock_operation(queue_server: &MockServer, operation: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(header(
            "x-amz-target",
            format!("AmazonSQS.{operation}").as_str(),
        ))
        .respond_with(response)
        .mount(queue_server)
        .await;
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), AWS_JSON_CONTENT_TYPE)
}

pub fn messages_response(bodies: &[Value]) -> ResponseTemplate {
    let messages = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            json!({
                "MessageId": format!("m{i}"),
                "ReceiptHandle": format!("r{i}"),
                "Body": body.to_string(),
                "Attributes": {"SentTimestamp": "1700000000000"},
                "MessageAttributes": {
                    "origin": {"DataType": "String", "StringValue": "login-app"}
                },
            })
        })
        .collect::<Vec<_>>();
    json_response(json!({ "Messages": messages }))
}

pub fn queue_not_found_response() -> ResponseTemplate {
    ResponseTemplate::new(400)
        .insert_header(
            "x-amzn-query-error",
            "AWS.SimpleQueueService.NonExistentQueue;Sender",
        )
        .set_body_raw(
            json!({
                "__type": "com.amazonaws.sqs#QueueDoesNotExist",
                "message": "The specified queue does not exist.",
            })
            .to_string(),
            AWS_JSON_CONTENT_TYPE,
        )
}

pub fn scenario_login(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "device_type": "android",
        "ip": "1.2.3.4",
        "device_id": "dev-9",
        "locale": "en-US",
        "app_version": 3,
        "create_date": "2024-01-01",
    })
}
