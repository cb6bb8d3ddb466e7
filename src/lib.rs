//! mig2schema - extract the PostgreSQL schema produced by a set of migrations.
//!
//! Migrations are `<base>.up.sql` / `<base>.down.sql` pairs. Every up file is
//! applied, in name order, to a throwaway PostgreSQL container and the result
//! is read back and rendered either as a readable report or as DDL.
//!
//! # Quick Start
//!
//! ```no_run
//! use mig2schema::api::{extract_blocking, ExtractOptions};
//!
//! let result = extract_blocking(ExtractOptions::new("./migrations")).unwrap();
//! println!("{}", result.output);
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level API used by the CLI and the MCP server
//! - [`migrations`] - Discovery and pairing of migration files
//! - [`model`] - Schema snapshot types (Table, Column, Index)
//! - [`render`] - Info and SQL renderings of a snapshot
//! - [`provider`] - Schema extraction strategies
//! - [`mcp`] - JSON-RPC tool server over stdio

pub mod api;
pub mod mcp;
pub mod migrations;
pub mod model;
pub mod pg;
pub mod provider;
pub mod render;
pub mod util;
