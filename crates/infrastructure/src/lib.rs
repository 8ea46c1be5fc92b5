//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_token_provider;
mod api_base_url;
mod http_lock_transport;
mod in_memory_lock_record_repository;

pub use access_token_provider::{FileAccessTokenProvider, StaticAccessTokenProvider};
pub use api_base_url::{
    ApiBaseUrlSources, DEFAULT_API_BASE_URL, parse_api_base_url, resolve_api_base_url,
};
pub use http_lock_transport::{HttpLockTransport, HttpReleaseBeacon};
pub use in_memory_lock_record_repository::InMemoryLockRecordRepository;
