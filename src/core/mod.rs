//! Core translation engine module

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod guard;
pub mod languages;
pub mod models;
pub mod quota;
