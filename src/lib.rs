//! repodash: a terminal dashboard for browsing a repository.
//!
//! Panes live in tabs, popups stack on top, and vi-style key sequences
//! resolve through a scoped binding registry into actions that the
//! dashboard routes. The [`engine`] runs input, handling, rendering,
//! signals and file watching as separate loops.

pub mod app;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod services;
pub mod view;
