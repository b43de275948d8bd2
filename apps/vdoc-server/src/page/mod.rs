//! Form Page Module
//!
//! The upload, crop, extract and submit flow shared by every page profile.

mod form;

pub use form::{Extraction, FormPage, PageError, PageServices, NO_TEXT_EXTRACTED};
