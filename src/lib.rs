//! flashgen - resumable batch generator for flashcard illustration assets
//!
//! Parses a vocabulary document into categories, generates one toddler
//! illustration per word through a generative-image endpoint, writes each
//! result to a flat per-category tree and an Xcode imageset bundle, and
//! persists progress as JSON after every attempt so interrupted runs
//! resume where they left off.

pub mod assets;
pub mod imagen;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod vocab;
