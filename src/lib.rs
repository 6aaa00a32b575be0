//! Typed content blocks and the pipeline that turns them into page previews.
//!
//! Data flows one way: stored page content is decoded into [`domain::blocks::Block`]s,
//! each block is rendered by a [`application::render::BlockRenderer`], the
//! [`application::page::PageRenderer`] assembles header, body and footer, and the
//! [`application::preview::PreviewHost`] frames the result at a chosen viewport.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
