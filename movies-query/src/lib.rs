//! # Movies Query
//!
//! Cache-aside read layer over the movies search indices. One generic
//! query service handles single-entity lookups and paginated, sorted,
//! optionally filtered listings; it is instantiated once per entity kind
//! (media, person, genre) at process startup and injected into the HTTP
//! handlers.
//!
//! The cache has no authority over correctness — the search index is the
//! source of truth and cache entries only bound read latency. Cache
//! failures degrade to direct index reads; they never fail a request.
//!
//! ## Modules
//!
//! - [`cache`]: Cache store trait, Redis implementation, key policy
//! - [`service`]: The generic query service
//! - [`errors`]: Error types for the query layer

pub mod cache;
pub mod errors;
pub mod service;

pub use cache::{CacheStore, RedisCache};
pub use errors::QueryError;
pub use service::{GenreQueryService, MediaQueryService, PersonQueryService, QueryService};
