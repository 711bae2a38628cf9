pub mod app;
pub mod autosave;
pub mod backup;
pub mod config;
pub mod db;
pub mod format;
pub mod logging;
pub mod shell;
pub mod slip;
pub mod templates;
pub mod ui;
pub mod validate;
