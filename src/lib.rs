//! Formshift - batch conversion of video, audio, images, documents and PDFs
//!
//! This library crate exposes the core functionality for integration testing.

pub mod batch;
pub mod config;
pub mod controller;
pub mod convert;
pub mod edit;
pub mod registry;
pub mod settings;
