//! promptport_core: a local prompt library
//!
//! Saves short text prompts with tags, searches them, moves them in and out
//! of plain-text files, and backs them up to a drive folder. Features:
//! - Prompt library (create, edit, delete, substring search)
//! - Text export and import (structured lines, plain lines, DOCX scrape)
//! - Backup and restore of the whole collection
//! - Local usage analytics and a one-time feedback prompt
//!
//! ## Architecture
//!
//! - **Storage**: a key/value store (SQLite or in-memory) holding JSON blobs
//! - **Session**: owns the library, analytics and drive for one profile
//! - **Commands**: "category.action" handlers over the session
//! - **RPC**: JSON-RPC 2.0 over stdio, served by the `promptport` binary

pub mod analytics;
pub mod backup;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod feedback;
pub mod library;
pub mod rpc;
pub mod runtime;
pub mod search;
pub mod session;
pub mod transfer;
