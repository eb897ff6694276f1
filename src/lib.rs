pub mod api;
pub mod chart;
pub mod cli;
pub mod core;
pub mod prefs;
