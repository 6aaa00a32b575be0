//! Askama views for preview documents.

pub mod views;
