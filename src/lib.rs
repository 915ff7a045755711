//! # Blog Index
//!
//! Keeps an in-memory index of a file-backed blog up to date.
//!
//! Content lives in a directory tree (optionally a git working copy of a
//! remote repository). Each immediate subdirectory holding the topic file is
//! a topic; every other markdown file beside it is an article. Metadata comes
//! from an HTML-comment header block at the top of each file.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌──────────┐
//! │  Remote   │──▶│  Walker   │──▶│  Updater  │──▶│ Receivers│
//! │ git sync  │   │ checksums │   │   delta   │   │          │
//! └───────────┘   └───────────┘   └───────────┘   └────┬─────┘
//!                                                      │
//!                              ┌───────────────────────┤
//!                              ▼                       ▼
//!                        ┌──────────┐           ┌────────────┐
//!                        │  Store   │──reindex─▶│   Index    │
//!                        └──────────┘           └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! blogidx scan                  # one cycle, print what was found
//! blogidx topics                # list topics
//! blogidx recent --limit 5      # newest published articles
//! blogidx get rust traits       # one article as JSON
//! blogidx run                   # keep refreshing until Ctrl-C
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Errors that abort a refresh cycle |
//! | [`reader`] | File-backed header parsing and checksums |
//! | [`walker`] | Directory walk producing a delta |
//! | [`remote`] | Git clone/pull of the content repository |
//! | [`updater`] | Refresh cycles and receiver fan-out |
//! | [`receivers`] | Store-and-reindex and cache revalidation |
//! | [`scheduler`] | Interval refresh and daily jobs |
//! | [`metrics`] | Log-backed metrics sink |
//! | [`commands`] | CLI command implementations |
//!
//! Parsing, models, the store trait and the index live in the
//! `blog-index-core` crate, which does no filesystem I/O of its own.

pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod reader;
pub mod receivers;
pub mod remote;
pub mod scheduler;
pub mod updater;
pub mod walker;
