//! VDoc Server Library
//!
//! Image cropping, OCR and vision extraction, and few-shot prompt composition
//! behind the drug, recipe and nutrition pages. The server binary is in
//! main.rs.
//!
//! # Modules
//!
//! - `crop`: crop regions and JPEG re-encoding at native resolution
//! - `ocr`: staged cloud text detection
//! - `vision`: ingredient detection with a vision model
//! - `genai`: generative model client shared by `vision` and `compose`
//! - `compose`: page profiles, prompts and sanitized rendering
//! - `page`: the upload, crop, extract and submit flow
//! - `routes`: HTTP endpoints

pub mod compose;
pub mod config;
pub mod crop;
pub mod error;
pub mod genai;
pub mod ocr;
pub mod page;
pub mod routes;
pub mod state;
pub mod vision;
