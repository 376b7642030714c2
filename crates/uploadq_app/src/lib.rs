//! Terminal front end for the upload queue engine.
pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
