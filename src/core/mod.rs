//! core
//!
//! Domain types and value objects shared by the API and resolver layers.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Username, RepoName
//! - [`connection`] - Connection and Credentials value objects
//! - [`catalog`] - Distribution catalog wire types
//! - [`package`] - Package files queued for upload
//! - [`config`] - Configuration schema and loading

pub mod catalog;
pub mod config;
pub mod connection;
pub mod package;
pub mod types;
