//! Text layout helpers for the transcript.
//!
//! - [`wrap_text`] - Wrap message bodies to the transcript width
//! - [`visual_width`], [`truncate_to_width`] - Cell-width aware measuring

mod width;
mod wrap;

pub use width::{truncate_to_width, visual_width};
pub use wrap::wrap_text;
