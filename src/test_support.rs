//! In-memory fakes for the cache, translation and simplification seams.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::translation::{TranslatedSegment, TranslationResponse};
use crate::error::{CacheError, ExternalServiceError};
use crate::services::{translator, ArticleCache, Simplifier, Translator};

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    unavailable: bool,
}

impl InMemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_entry(key: &str, value: &str) -> Arc<Self> {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Arc::new(cache)
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            unavailable: true,
            ..Self::default()
        })
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.unavailable {
            return Err(CacheError::Command(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check_available()?;
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        self.check_available()
    }
}

pub struct FakeTranslator {
    outcome: Result<String, String>,
    delay: Duration,
    calls: AtomicUsize,
    last_target: Mutex<Option<String>>,
}

impl FakeTranslator {
    pub fn returning(text: &str) -> Arc<Self> {
        Self::build(Ok(text.to_string()), Duration::ZERO)
    }

    /// Responds with a provider error carrying `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        Self::build(Err(message.to_string()), Duration::ZERO)
    }

    pub fn slow(text: &str, delay: Duration) -> Arc<Self> {
        Self::build(Ok(text.to_string()), delay)
    }

    fn build(outcome: Result<String, String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            delay,
            calls: AtomicUsize::new(0),
            last_target: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_target(&self) -> Option<String> {
        self.last_target.lock().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        _text: &str,
        target_lang: &str,
    ) -> Result<TranslationResponse, ExternalServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock() = Some(target_lang.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.outcome {
            Ok(text) => Ok(TranslationResponse {
                translations: vec![TranslatedSegment {
                    text: text.clone(),
                    detected_source_language: Some("EN".to_string()),
                }],
            }),
            Err(message) => Err(ExternalServiceError::Provider {
                service: translator::SERVICE,
                message: message.clone(),
            }),
        }
    }
}

pub struct FakeSimplifier {
    outcome: Option<String>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl FakeSimplifier {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    /// Fails as if the provider sent back an unusable body.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: None,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().clone()
    }
}

#[async_trait]
impl Simplifier for FakeSimplifier {
    async fn simplify(&self, text: &str) -> Result<String, ExternalServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock() = Some(text.to_string());

        self.outcome
            .clone()
            .ok_or_else(|| ExternalServiceError::InvalidResponse {
                service: "OpenAI",
                message: "no completion choices returned".to_string(),
            })
    }
}
