//! Application layer with the image cache service.

/// Service implementations.
pub mod services;

pub use services::CacheService;
