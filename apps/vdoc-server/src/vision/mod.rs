//! Vision Module
//!
//! Sends a data-URL image to a vision-capable model with a fixed instruction
//! and returns the comma-separated ingredient names it answers with.

mod detector;

pub use detector::{split_data_url, IngredientDetector, VisionError, INGREDIENT_INSTRUCTION};
