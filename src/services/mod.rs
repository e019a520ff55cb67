//! Service layer modules for external integrations.
//!
//! Contains the Redis article cache, the DeepL and OpenAI clients, and the
//! per-key locks that de-duplicate concurrent cache misses.

pub mod cache;
pub mod simplifier;
pub mod single_flight;
pub mod translator;

pub use cache::{ArticleCache, RedisCache};
pub use simplifier::{OpenAiClient, Simplifier};
pub use single_flight::KeyedLocks;
pub use translator::{DeepLClient, Translator};
