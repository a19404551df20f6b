//! soilmatch: ranks soil/earth supply sites against a demand request.
//!
//! The crate is split into the pure ranking engine ([`engine`]), the
//! result cache ([`cache`]), the external collaborators it ranks against
//! ([`distance`], [`repository`], [`interpret`]) and the HTTP service
//! wrapped around them ([`service`], [`api`]).

pub mod api;        // HTTP endpoint handlers
pub mod cache;      // Result cache and cache keys
pub mod config;     // Configuration management
pub mod distance;   // Distance and geocoding providers
pub mod engine;     // Filtering, scoring and ranking
pub mod error;      // Error types and handling
pub mod interpret;  // Request interpretation boundary
pub mod models;     // Data structures and types
pub mod repository; // Candidate sources
pub mod service;    // Request orchestration
