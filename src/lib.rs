//! Oura sleep ingestion - pulls sleep sessions from the Oura Ring API into PostgreSQL
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod oura;
pub mod routes;
pub mod services;
pub mod sync;
