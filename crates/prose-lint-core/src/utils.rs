//! Text helpers shared by rule implementations.

pub mod emoji;

#[doc(inline)]
pub use emoji::{first_emoji_offset, is_emoji_grapheme};
