pub mod app;
pub mod browser;
pub mod config;
pub mod diagnose;
pub mod effects;
pub mod headless;
pub mod logging;
pub mod ui;
