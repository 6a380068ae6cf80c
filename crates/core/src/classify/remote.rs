use crate::classify::{ClassifyError, TextEmotion, TextEmotionClassifier};
use crate::util::retry::{is_http_retryable, retry_with_backoff, RetryConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Text emotion via a hosted text-classification endpoint (Hugging Face
/// inference API shape: one input string in, a ranked label list out).
#[derive(Clone)]
pub struct RemoteTextClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl RemoteTextClassifier {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            retry: RetryConfig::default(),
        }
    }

    async fn request_once(&self, text: &str) -> Result<TextEmotion, ClassifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(ClassifyError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The API wraps the label list in a one-element batch.
        let batches: Vec<Vec<ScoredLabel>> = response
            .json()
            .await
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;

        let top = batches
            .into_iter()
            .flatten()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| ClassifyError::InvalidResponse("empty label list".to_owned()))?;

        Ok(TextEmotion::new(top.label, top.score))
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct ScoredLabel {
    label: String,
    score: f32,
}

fn is_retryable(error: &ClassifyError) -> bool {
    match error {
        ClassifyError::Network(e) => e.is_timeout() || e.is_connect(),
        ClassifyError::Api { status, .. } => is_http_retryable(*status),
        ClassifyError::InvalidResponse(_) => false,
    }
}

impl TextEmotionClassifier for RemoteTextClassifier {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<TextEmotion, ClassifyError>> {
        async move {
            let result = retry_with_backoff(
                &self.retry,
                || self.request_once(&text),
                is_retryable,
            )
            .await?;
            tracing::debug!(label = %result.label, confidence = result.confidence, "text classified");
            Ok(result)
        }
        .boxed()
    }
}
