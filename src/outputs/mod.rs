//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`table`]: aligned text table for the terminal
//! - [`csv`]: CSV export (`Fuente,Titular` / `Fuente,Headline`)
//! - [`json`]: dated JSON snapshots of a run
//! - [`trends`]: word frequencies and a short trend summary

pub mod csv;
pub mod json;
pub mod table;
pub mod trends;
