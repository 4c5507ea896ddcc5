use {
    super::{FetchError, MessageSource, RawMessage},
    crate::config::Configuration,
    async_trait::async_trait,
    aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region},
    aws_credential_types::{provider::error::CredentialsError, Credentials},
    aws_sdk_sqs::{
        error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
        types::{Message, MessageSystemAttributeName},
        Client,
    },
    std::{error::Error as StdError, fmt::Debug, time::Duration},
    tracing::{debug, info, instrument},
};

/// Slack on top of the long-poll wait before a queue call is abandoned.
const OPERATION_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

const QUEUE_NOT_FOUND_CODES: [&str; 2] =
    ["AWS.SimpleQueueService.NonExistentQueue", "QueueDoesNotExist"];

pub struct SqsMessageSource {
    client: Client,
    queue_url: String,
    max_messages: i32,
    visibility_timeout: Duration,
    wait_time: Duration,
}

impl SqsMessageSource {
    pub async fn new(config: &Configuration) -> Result<Self, FetchError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.queue_region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.queue_wait_time + OPERATION_TIMEOUT_MARGIN)
                    .build(),
            );

        if let Some(endpoint) = &config.queue_endpoint {
            loader = loader.endpoint_url(endpoint.as_str());
        }

        match (&config.aws_access_key_id, &config.aws_secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    "login-etl",
                ));
            }
            (None, None) => {}
            _ => return Err(FetchError::PartialCredentials),
        }

        // Without a key pair the default chain is installed; an empty chain
        // surfaces as `MissingCredentials` on the first queue call
        let sdk_config = loader.load().await;

        Ok(Self {
            client: Client::new(&sdk_config),
            queue_url: config.queue_url.to_string(),
            max_messages: config.queue_max_messages(),
            visibility_timeout: config.queue_visibility_timeout,
            wait_time: config.queue_wait_time,
        })
    }
}

#[async_trait]
impl MessageSource for SqsMessageSource {
    #[instrument(skip_all, fields(queue_url = %self.queue_url))]
    async fn fetch_batch(&self) -> Result<Vec<RawMessage>, FetchError> {
        info!("Attempting to fetch messages from queue");
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.max_messages)
            .visibility_timeout(as_seconds(self.visibility_timeout))
            .wait_time_seconds(as_seconds(self.wait_time))
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| fetch_error(e, &self.queue_url))?;

        let messages = output
            .messages()
            .iter()
            .map(raw_message)
            .collect::<Vec<_>>();
        if messages.is_empty() {
            info!("No messages found in the queue");
        } else {
            info!(count = messages.len(), "Received messages");
        }
        Ok(messages)
    }

    #[instrument(skip_all, fields(message_id = ?message.message_id))]
    async fn acknowledge(&self, message: &RawMessage) -> Result<(), FetchError> {
        let receipt_handle = message
            .receipt_handle
            .as_deref()
            .ok_or_else(|| FetchError::Transport("message has no receipt handle".to_owned()))?;
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| fetch_error(e, &self.queue_url))?;
        debug!("Deleted message from queue");
        Ok(())
    }
}

fn as_seconds(duration: Duration) -> i32 {
    i32::try_from(duration.as_secs()).unwrap_or(i32::MAX)
}

fn raw_message(message: &Message) -> RawMessage {
    RawMessage {
        message_id: message.message_id().map(str::to_owned),
        receipt_handle: message.receipt_handle().map(str::to_owned),
        body: message.body().map(str::to_owned),
        attributes: message
            .attributes()
            .map(|attributes| {
                attributes
                    .iter()
                    .map(|(name, value)| (name.as_str().to_owned(), value.clone()))
                    .collect()
            })
            .unwrap_or_default(),
        message_attributes: message
            .message_attributes()
            .map(|attributes| {
                attributes
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .string_value()
                            .map(|value| (name.clone(), value.to_owned()))
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn fetch_error<E, R>(err: SdkError<E, R>, queue_url: &str) -> FetchError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code());
    if code.is_some_and(|code| QUEUE_NOT_FOUND_CODES.contains(&code)) {
        return FetchError::QueueNotFound(queue_url.to_owned());
    }

    match find_credentials_error(&err) {
        Some(CredentialsError::CredentialsNotLoaded(_)) => return FetchError::MissingCredentials,
        Some(CredentialsError::InvalidConfiguration(_)) => return FetchError::PartialCredentials,
        _ => {}
    }
    FetchError::Transport(DisplayErrorContext(err).to_string())
}

fn find_credentials_error<'a>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a CredentialsError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(credentials_error) = e.downcast_ref::<CredentialsError>() {
            return Some(credentials_error);
        }
        current = e.source();
    }
    None
}
