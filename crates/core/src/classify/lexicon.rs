use crate::classify::{ClassifyError, TextEmotion, TextEmotionClassifier};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Confidence reported when a keyword family matches. Above the fusion
/// gate, so a clear keyword hit decides the final label.
const MATCHED_CONFIDENCE: f32 = 0.75;
/// Confidence for text with no keyword hit; below the fusion gate so the
/// audio signal can take over.
const UNMATCHED_CONFIDENCE: f32 = 0.4;

/// Keyword families, checked in order. Labels follow the hosted model's
/// vocabulary so the two classifiers are interchangeable.
const LEXICON: &[(&str, &[&str])] = &[
    ("joy", &["happy", "joy", "glad", "excited", "great", "love", "wonderful"]),
    ("sadness", &["sad", "unhappy", "depressed", "miserable", "terrible", "awful"]),
    ("anger", &["angry", "mad", "furious", "hate", "annoyed"]),
    ("fear", &["scared", "afraid", "fear", "terrified", "worried"]),
    ("disgust", &["disgust", "disgusting", "gross", "revolting"]),
    ("surprise", &["surprise", "surprised", "amazing", "wow", "unbelievable"]),
];

/// Offline keyword-based classifier. A fallback for running without the
/// hosted endpoint; deliberately crude.
#[derive(Clone, Debug, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn match_label(text: &str) -> TextEmotion {
        let lower = text.to_lowercase();
        for (label, keywords) in LEXICON {
            if keywords.iter().any(|k| lower.contains(k)) {
                return TextEmotion::new(*label, MATCHED_CONFIDENCE);
            }
        }
        TextEmotion::new("neutral", UNMATCHED_CONFIDENCE)
    }
}

impl TextEmotionClassifier for LexiconClassifier {
    fn classify(&self, text: String) -> BoxFuture<'_, Result<TextEmotion, ClassifyError>> {
        async move { Ok(Self::match_label(&text)) }.boxed()
    }
}
