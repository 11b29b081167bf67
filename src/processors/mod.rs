//! File processors

pub mod subtitle;
