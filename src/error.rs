//! Load-time error taxonomy.
//!
//! Everything here is fatal at the call site that loads assets. Per-frame
//! paths (`submit`, `advance`, `end_batch`) never return errors; bad
//! submissions are dropped so a single despawned entity can never interrupt
//! the render loop.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading a sprite sheet or attaching an overlay layer.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Image decode failed
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tile counts must be positive
    #[error("tile count must be positive, got {count_x}x{count_y}")]
    ZeroTileCount { count_x: u32, count_y: u32 },

    /// Texture dimensions must divide evenly into tiles
    #[error(
        "texture {texture_width}x{texture_height} is not divisible into \
         {tile_width}x{tile_height} tiles"
    )]
    NotDivisible {
        texture_width: u32,
        texture_height: u32,
        tile_width: u32,
        tile_height: u32,
    },

    /// Overlay image dimensions must match the base sheet
    #[error("overlay {path:?} is {got_width}x{got_height}, base sheet is {want_width}x{want_height}")]
    OverlayDimensionMismatch {
        path: PathBuf,
        got_width: u32,
        got_height: u32,
        want_width: u32,
        want_height: u32,
    },

    /// Overlay attached to an id the registry doesn't know
    #[error("unknown atlas id {0}")]
    UnknownAtlas(u32),
}

/// Errors from loading a directory of animation descriptors.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("animation descriptor directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("animation descriptor has empty key: {0:?}")]
    EmptyKey(PathBuf),

    #[error("duplicate animation key '{key}' from {path:?}")]
    DuplicateKey { key: String, path: PathBuf },

    #[error("frame sequence '{sequence}' in '{key}' has no frames")]
    EmptySequence { key: String, sequence: String },

    #[error("frame sequence '{sequence}' in '{key}' has non-positive frame time")]
    BadFrameTime { key: String, sequence: String },
}

/// Errors from loading an MSDF font descriptor and its atlas.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("font atlas error: {0}")]
    Sheet(#[from] SheetError),

    #[error("font descriptor has invalid atlas size {0}")]
    InvalidAtlasSize(i64),

    #[error("glyph key '{0}' is not a codepoint")]
    BadGlyphKey(String),
}
