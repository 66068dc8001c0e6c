//! Collaboration use-case services.
//!
//! # Responsibility
//! - Sequence repository calls into atomic collaboration operations.
//! - Keep API layers decoupled from storage details.

pub mod collab_service;
pub mod mention_parser;
