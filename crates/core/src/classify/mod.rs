mod lexicon;
mod remote;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use lexicon::LexiconClassifier;
pub use remote::RemoteTextClassifier;

/// One label and the classifier's confidence for that label only; no full
/// distribution is carried. Labels are lowercase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextEmotion {
    pub label: String,
    pub confidence: f32,
}

impl TextEmotion {
    pub fn new<S: Into<String>>(label: S, confidence: f32) -> Self {
        Self {
            label: label.into().to_lowercase(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The normalized result for blank input: low-confidence neutral,
    /// which fusion treats as an uncertain text signal.
    pub fn neutral() -> Self {
        Self {
            label: "neutral".to_owned(),
            confidence: 0.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("classifier returned http {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected classifier response: {0}")]
    InvalidResponse(String),
}

pub trait TextEmotionClassifier: Send + Sync {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<TextEmotion, ClassifyError>>;
}

/// Type-erased handle so callers can pick an implementation at runtime.
#[derive(Clone)]
pub struct Classifier {
    inner: Arc<dyn TextEmotionClassifier>,
}

impl Classifier {
    pub fn new(inner: Arc<dyn TextEmotionClassifier>) -> Self {
        Self { inner }
    }
}

impl TextEmotionClassifier for Classifier {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<TextEmotion, ClassifyError>> {
        self.inner.classify(text)
    }
}

/// Resolve the text emotion for a transcript. Blank or whitespace-only
/// text short-circuits to neutral with zero confidence and the classifier
/// is never invoked; non-empty text is forwarded and a classifier failure
/// propagates to the caller.
pub async fn resolve_text_emotion(
    text: &str,
    classifier: &dyn TextEmotionClassifier,
) -> Result<TextEmotion, ClassifyError> {
    if text.trim().is_empty() {
        return Ok(TextEmotion::neutral());
    }
    classifier.classify(text.to_owned()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClassifier {
        calls: AtomicUsize,
        result: TextEmotion,
    }

    impl CountingClassifier {
        fn returning(result: TextEmotion) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }
    }

    impl TextEmotionClassifier for CountingClassifier {
        fn classify(&self, _text: String) -> BoxFuture<'_, Result<TextEmotion, ClassifyError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            async move { Ok(result) }.boxed()
        }
    }

    #[test]
    fn blank_text_short_circuits_without_calling_the_classifier() {
        let stub = CountingClassifier::returning(TextEmotion::new("joy", 0.9));
        for text in ["", "   ", "\t\n"] {
            let result =
                futures::executor::block_on(resolve_text_emotion(text, &stub)).expect("resolved");
            assert_eq!(result, TextEmotion::neutral());
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_empty_text_is_forwarded() {
        let stub = CountingClassifier::returning(TextEmotion::new("anger", 0.8));
        let result = futures::executor::block_on(resolve_text_emotion("I am furious", &stub))
            .expect("resolved");
        assert_eq!(result.label, "anger");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn labels_are_lowercased_and_confidence_clamped() {
        let e = TextEmotion::new("JOY", 1.5);
        assert_eq!(e.label, "joy");
        assert_eq!(e.confidence, 1.0);
    }
}
