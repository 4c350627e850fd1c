pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod event;
pub mod exit;
pub mod index;
pub mod logs;
pub mod parse;
pub mod render;
pub mod store;
pub mod ui;
