//! # Blog Index Core
//!
//! Filesystem-free logic for blog-index: content models, header block
//! parsing, entity construction, checksum tracking, the store trait and
//! the lookup index served to readers.
//!
//! Everything here works on values and `std::io` readers handed in by the
//! caller; opening files and walking directories lives in the `blog-index`
//! crate.

pub mod checksum;
pub mod delta;
pub mod entity;
pub mod headers;
pub mod index;
pub mod metrics;
pub mod models;
pub mod store;
