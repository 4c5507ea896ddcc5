use {
    crate::{
        config::Configuration,
        model::types::UserLogin,
        sink::{persist, LoginSink, PersistError},
        source::{DecodeError, FetchError, MessageSource, RawMessage},
        transform::{transform, TransformError},
    },
    tracing::{error, info, instrument, warn},
};

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl MessageError {
    /// The message was deliberately dropped rather than failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Transform(TransformError::InvalidMessageType))
    }

    fn is_store_failure(&self) -> bool {
        matches!(self, Self::Persist(PersistError::Store(_)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub delete_processed: bool,
    pub max_consecutive_store_failures: Option<u32>,
}

impl From<&Configuration> for PipelineOptions {
    fn from(config: &Configuration) -> Self {
        Self {
            delete_processed: config.queue_delete_processed,
            max_consecutive_store_failures: config.store_max_consecutive_failures,
        }
    }
}

/// Outcome of one run, used for the summary log and the exit code.
#[derive(Debug, Default)]
pub struct RunReport {
    pub fetched: usize,
    pub inserted: usize,
    pub rejected: usize,
    pub decode_failed: usize,
    pub transform_failed: usize,
    pub persist_failed: usize,
    /// Messages left on the queue after the circuit breaker opened
    pub skipped: usize,
    pub ack_failed: usize,
    pub fetch_error: Option<FetchError>,
    pub aborted: bool,
    pub dump_failed: bool,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.decode_failed + self.transform_failed + self.persist_failed
    }

    pub fn is_success(&self) -> bool {
        self.fetch_error.is_none()
            && self.failed() == 0
            && self.skipped == 0
            && self.ack_failed == 0
            && !self.aborted
            && !self.dump_failed
    }

    /// 0 on full success, 2 when the fetch failed, 1 for any other failure.
    pub fn exit_code(&self) -> u8 {
        if self.fetch_error.is_some() {
            2
        } else if self.is_success() {
            0
        } else {
            1
        }
    }

    fn record(&mut self, result: &Result<UserLogin, MessageError>) {
        match result {
            Ok(_) => self.inserted += 1,
            Err(e) if e.is_rejection() => self.rejected += 1,
            Err(MessageError::Decode(_)) => self.decode_failed += 1,
            Err(MessageError::Transform(_)) => self.transform_failed += 1,
            Err(MessageError::Persist(_)) => self.persist_failed += 1,
        }
    }
}

/// Straight-line fetch → transform → persist pass over one queue batch.
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    options: PipelineOptions,
}

impl<S, K> Pipeline<S, K>
where
    S: MessageSource + Sync,
    K: LoginSink + Sync,
{
    pub fn new(source: S, sink: K, options: PipelineOptions) -> Self {
        Self {
            source,
            sink,
            options,
        }
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    #[instrument(skip_all)]
    pub async fn run_once(&self) -> RunReport {
        let mut report = RunReport::default();

        let messages = match self.source.fetch_batch().await {
            Ok(messages) => messages,
            Err(e) => {
                error!("Failed to fetch messages: {e}");
                report.fetch_error = Some(e);
                return report;
            }
        };
        report.fetched = messages.len();

        let mut consecutive_store_failures = 0;
        for (index, message) in messages.iter().enumerate() {
            let result = handle_message(message, &self.sink).await;
            report.record(&result);

            match &result {
                Ok(login) => info!(user_id = %login.user_id, "Processed message"),
                Err(e) if e.is_rejection() => {
                    warn!(message_id = ?message.message_id, "Rejected message: {e}")
                }
                Err(e) => warn!(message_id = ?message.message_id, "Failed to process message: {e}"),
            }

            let acknowledge = match &result {
                Ok(_) => true,
                Err(e) => e.is_rejection(),
            };
            if acknowledge && self.options.delete_processed {
                if let Err(e) = self.source.acknowledge(message).await {
                    warn!(message_id = ?message.message_id, "Failed to delete message: {e}");
                    report.ack_failed += 1;
                }
            }

            match &result {
                Err(e) if e.is_store_failure() => consecutive_store_failures += 1,
                _ => consecutive_store_failures = 0,
            }
            // A limit of 0 leaves the breaker disabled
            if let Some(limit) = self
                .options
                .max_consecutive_store_failures
                .filter(|limit| *limit > 0)
            {
                if consecutive_store_failures >= limit {
                    report.skipped = messages.len() - index - 1;
                    report.aborted = true;
                    error!(
                        consecutive_store_failures,
                        skipped = report.skipped,
                        "Store keeps failing, leaving the rest of the batch on the queue"
                    );
                    break;
                }
            }
        }

        report
    }
}

#[instrument(skip_all, fields(message_id = ?message.message_id))]
pub async fn handle_message<K>(message: &RawMessage, sink: &K) -> Result<UserLogin, MessageError>
where
    K: LoginSink + Sync + ?Sized,
{
    let record = message.decode()?;
    let flattened = transform(&record)?;
    let login = persist(sink, &flattened).await?;
    Ok(login)
}
