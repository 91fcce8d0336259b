//! HTTP API: edge policy, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod cors;
pub mod middleware;
