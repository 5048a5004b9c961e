//! Text rendering as sprites: MSDF fonts and glyph layout.

pub mod font;

pub use font::{Glyph, GlyphLayout, MsdfFont};
