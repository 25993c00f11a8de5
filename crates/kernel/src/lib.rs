//! NWU IAN Blog Kernel Library
//!
//! This library exposes kernel internals for integration testing.
//! The main entry point for running the server is the `nwuian` binary.

pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod file;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod theme;
