//! GoodData Core
//!
//! Typed DTOs for the GoodData platform REST API.
//!
//! This crate contains:
//! - Domain types: server resources (Project, Warehouse, Role, User, Account)
//! - Collections: generic deserialization of pageable lists
//! - DTOs: task handles, login exchanges, error bodies and other payloads
//!
//! It performs no I/O; see `gooddata-client` for the HTTP side.

#[macro_use]
mod format;

pub mod collections;
pub mod domain;
pub mod dto;
pub mod envelope;

pub use collections::{Page, PageRequest, Paging};
pub use envelope::{Envelope, Listed, Resource};
pub use format::{Flag, TIMESTAMP_FORMAT, parse_timestamp};
