//! galaxy_query library - SQL composition for OSM analytics reports
//!
//! Turns validated report requests (mapathon, data quality, user statistics,
//! training) into parameterized PostgreSQL statements, plus the command and
//! output layer of the `galaxy_query` CLI. Nothing here executes SQL.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod output;
pub mod queries;
pub mod types;

#[macro_use]
pub mod test_macros;
