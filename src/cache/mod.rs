//! Session-scoped result cache
//!
//! A process-lifetime key to (timestamp, payload) map with expiry checked at
//! read time. Constructed once per session and injected wherever caching is
//! applied; never a module-level singleton.

mod store;
mod types;

pub use store::MemoryCache;
pub use types::CachePayload;
