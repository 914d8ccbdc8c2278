//! Molar - dental X-ray enhancement and AI-assisted analysis
//!
//! A single-page web form: upload an X-ray, enter the patient's history,
//! tune denoising and contrast, and ask a hosted model for an analysis.
//! This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
