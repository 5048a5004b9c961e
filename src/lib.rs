//! Spriteflow - instanced 2D sprite batching engine.
//!
//! Renders large numbers of independently animated sprites from shared
//! texture atlases with one instanced draw call per atlas chunk. Text is
//! rendered through the same path via MSDF glyph layout.
//!
//! Per-frame flow: advance each sprite's [`AnimationState`], resolve its
//! tile rectangle from the sheet, `submit` into a [`SpriteBatcher`], then
//! `end_batch` on the [`SpriteRenderer`] to upload and draw.

pub mod config;
pub mod error;
pub mod gpu;
pub mod metrics;
pub mod renderer;
pub mod sprites;
pub mod text;

pub use config::BatchConfig;
pub use error::{FontError, LibraryError, SheetError};
pub use metrics::RenderMetrics;
pub use renderer::{Frame, SpriteRenderer};
pub use sprites::animation::{AnimationState, FrameSequence};
pub use sprites::atlas::{AtlasGrid, AtlasId, AtlasRegistry, OverlayKind, SpriteSheet};
pub use sprites::batch::{BatchKind, DrawCall, DrawPlan, SpriteBatcher};
pub use sprites::instance::SpriteInstance;
pub use sprites::library::{AnimationDef, AnimationLibrary};
pub use text::font::{Glyph, GlyphLayout, MsdfFont};
