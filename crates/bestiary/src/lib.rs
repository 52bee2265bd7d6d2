//! `bestiary` - Read, check and index creature stat blocks
//!
//! This library parses HTML and Markdown stat blocks into a typed
//! [`StatBlock`], checks the arithmetic between ability scores, modifiers
//! and saving throws, and builds a JSON/CSV index and a `SQLite` catalogue
//! of [`MonsterRecord`]s.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod parse;
pub mod record;
pub mod scan;
pub mod statblock;
pub mod storage;
pub mod text;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{json_to_csv, ExportSummary};
pub use logging::init_logging;
pub use parse::{read_document, Document};
pub use record::MonsterRecord;
pub use scan::{write_json, ScanSummary, Scanner};
pub use statblock::{check, CheckReport, StatBlock};
pub use storage::{MonsterQuery, Storage, StorageStats, StoredMonster};
