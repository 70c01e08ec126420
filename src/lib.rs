//! Resilient search-and-extract engine for hotel booking result pages.
//!
//! The engine only talks to pages through [`driver::Document`], so the same
//! steps run against a live Chrome tab or a captured HTML snapshot.

pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod report;
pub mod scenario;
pub mod scrapers;
pub mod sink;
