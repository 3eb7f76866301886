//! Core use-case services.
//!
//! # Responsibility
//! - Compose stores and storage into use-case level APIs.
//! - Keep view layers decoupled from storage details.

pub mod board_service;
