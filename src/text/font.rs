//! MSDF fonts: glyph metrics plus layout into sprite submissions.
//!
//! Text rendering is implemented entirely in terms of the sprite submission
//! interface: [`MsdfFont::layout`] walks a string and yields one
//! [`SpriteInstance`] per visible glyph, which the caller (or
//! [`MsdfFont::draw_text`]) forwards verbatim into a batcher. No GPU work
//! happens here.

use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;

use crate::error::FontError;
use crate::renderer::SpriteRenderer;
use crate::sprites::atlas::{AtlasId, AtlasRegistry};
use crate::sprites::batch::SpriteBatcher;
use crate::sprites::instance::SpriteInstance;

/// The ASCII range the offline atlas generator emits glyphs for.
const FIRST_CODEPOINT: u32 = 32;
const LAST_CODEPOINT: u32 = 126;

/// Metrics for one glyph, in font pixels at scale 1.0.
#[derive(Clone, Copy, Debug)]
pub struct Glyph {
    /// Horizontal cursor advance.
    pub advance: f32,
    /// Offset from the cursor to the glyph's left edge.
    pub bearing_x: f32,
    /// Offset from the baseline up to the glyph's top edge.
    pub bearing_y: f32,
    /// Pixel size in the atlas.
    pub width: f32,
    pub height: f32,
    /// Normalized atlas rectangle (u0, v0, u1, v1).
    pub uv: [f32; 4],
}

/// Wire format of one glyph in the descriptor JSON.
#[derive(Deserialize)]
struct GlyphRecord {
    #[serde(default)]
    advance: f32,
    #[serde(default, rename = "bearingX")]
    bearing_x: f32,
    #[serde(default, rename = "bearingY")]
    bearing_y: f32,
    #[serde(default)]
    w: f32,
    #[serde(default)]
    h: f32,
    #[serde(default)]
    u0: f32,
    #[serde(default)]
    v0: f32,
    #[serde(default = "one")]
    u1: f32,
    #[serde(default = "one")]
    v1: f32,
}

fn one() -> f32 {
    1.0
}

/// Wire format of the font descriptor JSON.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontDescriptor {
    #[serde(default)]
    atlas_size: i64,
    /// Keyed by decimal codepoint.
    glyphs: AHashMap<String, GlyphRecord>,
}

/// An MSDF font atlas plus per-codepoint metrics.
pub struct MsdfFont {
    atlas: AtlasId,
    glyphs: AHashMap<u32, Glyph>,
    line_height: f32,
}

impl MsdfFont {
    /// Load glyph metrics from JSON and register the atlas PNG as a
    /// single-tile sheet with linear filtering (MSDF needs interpolation).
    pub fn load(
        renderer: &SpriteRenderer,
        registry: &mut AtlasRegistry,
        json_path: &Path,
        png_path: &Path,
    ) -> Result<Self, FontError> {
        let text = std::fs::read_to_string(json_path)?;
        let descriptor: FontDescriptor = serde_json::from_str(&text)?;

        if descriptor.atlas_size <= 0 {
            return Err(FontError::InvalidAtlasSize(descriptor.atlas_size));
        }

        let atlas = registry.load_sheet_filtered(
            renderer,
            png_path,
            1,
            1,
            false,
            wgpu::FilterMode::Linear,
        )?;

        let mut glyphs = AHashMap::with_capacity(descriptor.glyphs.len());
        let mut line_height = 0.0f32;

        for (key, record) in descriptor.glyphs {
            let codepoint: u32 = key
                .parse()
                .map_err(|_| FontError::BadGlyphKey(key.clone()))?;

            line_height = line_height.max(record.bearing_y);
            glyphs.insert(
                codepoint,
                Glyph {
                    advance: record.advance,
                    bearing_x: record.bearing_x,
                    bearing_y: record.bearing_y,
                    width: record.w,
                    height: record.h,
                    // The atlas stores glyph rows bottom-up; swap v so the
                    // quad's top edge samples the glyph's top.
                    uv: [record.u0, record.v1, record.u1, record.v0],
                },
            );
        }

        // Fallback if bearingY was missing or zero throughout
        if line_height <= 0.0 {
            line_height = 48.0;
        }

        tracing::info!(
            "Loaded MSDF font {:?}: {} glyphs, line height {}",
            json_path,
            glyphs.len(),
            line_height
        );

        Ok(Self {
            atlas,
            glyphs,
            line_height,
        })
    }

    /// The sheet this font's glyph rectangles index into.
    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    pub fn glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.glyphs.get(&codepoint)
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Lay out `text` with its top-left at `(x, y)`.
    ///
    /// Returns a lazy iterator of sprite records; stateless given the same
    /// inputs, so it can be restarted freely. Codepoints outside the
    /// supported range advance the cursor by a fallback width and emit
    /// nothing.
    pub fn layout<'a>(&'a self, text: &'a str, x: f32, y: f32, scale: f32) -> GlyphLayout<'a> {
        GlyphLayout {
            font: self,
            chars: text.chars(),
            cursor_x: x,
            // y is top-left; glyphs are positioned from the baseline
            baseline: y + self.line_height * scale,
            scale,
        }
    }

    /// Submit `text` into an open batch. The batcher should be in a
    /// `Font`-kind batch over this font's atlas.
    pub fn draw_text(
        &self,
        batcher: &mut SpriteBatcher,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
    ) {
        for instance in self.layout(text, x, y, scale) {
            batcher.submit(Some(self.atlas), instance);
        }
    }

    /// Pixel width of `text` at `scale`, from the same cursor arithmetic
    /// as [`layout`](Self::layout).
    pub fn measure(&self, text: &str, scale: f32) -> f32 {
        let mut width = 0.0;
        for c in text.chars() {
            let codepoint = c as u32;
            if !(FIRST_CODEPOINT..=LAST_CODEPOINT).contains(&codepoint) {
                width += self.line_height * 0.5 * scale;
            } else if let Some(glyph) = self.glyphs.get(&codepoint) {
                width += glyph.advance * scale;
            }
        }
        width
    }
}

/// Iterator over a string's glyph quads. See [`MsdfFont::layout`].
pub struct GlyphLayout<'a> {
    font: &'a MsdfFont,
    chars: std::str::Chars<'a>,
    cursor_x: f32,
    baseline: f32,
    scale: f32,
}

impl Iterator for GlyphLayout<'_> {
    type Item = SpriteInstance;

    fn next(&mut self) -> Option<SpriteInstance> {
        loop {
            let c = self.chars.next()?;
            let codepoint = c as u32;

            if !(FIRST_CODEPOINT..=LAST_CODEPOINT).contains(&codepoint) {
                self.cursor_x += self.font.line_height * 0.5 * self.scale;
                continue;
            }

            let Some(glyph) = self.font.glyph(codepoint) else {
                continue;
            };

            let gx = self.cursor_x + glyph.bearing_x * self.scale;
            let gy = self.baseline - glyph.bearing_y * self.scale;
            self.cursor_x += glyph.advance * self.scale;

            return Some(SpriteInstance::new(
                [gx, gy],
                [glyph.width * self.scale, glyph.height * self.scale],
                glyph.uv,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Font with two glyphs ('A' and 'B') and no GPU behind it.
    fn test_font() -> MsdfFont {
        let mut glyphs = AHashMap::new();
        glyphs.insert(
            'A' as u32,
            Glyph {
                advance: 10.0,
                bearing_x: 1.0,
                bearing_y: 8.0,
                width: 8.0,
                height: 8.0,
                uv: [0.0, 0.5, 0.5, 0.0],
            },
        );
        glyphs.insert(
            'B' as u32,
            Glyph {
                advance: 12.0,
                bearing_x: 2.0,
                bearing_y: 8.0,
                width: 9.0,
                height: 8.0,
                uv: [0.5, 0.5, 1.0, 0.0],
            },
        );
        MsdfFont {
            atlas: AtlasId::from_raw(0),
            glyphs,
            line_height: 8.0,
        }
    }

    #[test]
    fn layout_positions_from_bearings_and_baseline() {
        let font = test_font();
        let quads: Vec<_> = font.layout("AB", 100.0, 50.0, 1.0).collect();

        assert_eq!(quads.len(), 2);
        // baseline = 50 + 8; 'A' top = baseline - bearing_y = 50
        assert_eq!(quads[0].position, [101.0, 50.0]);
        assert_eq!(quads[0].size, [8.0, 8.0]);
        // 'B' starts after A's advance
        assert_eq!(quads[1].position, [112.0, 50.0]);
    }

    #[test]
    fn scale_applies_to_metrics_and_size() {
        let font = test_font();
        let quads: Vec<_> = font.layout("A", 0.0, 0.0, 2.0).collect();
        assert_eq!(quads[0].position, [2.0, 0.0]); // bearing_x * 2, baseline 16 - 16
        assert_eq!(quads[0].size, [16.0, 16.0]);
    }

    #[test]
    fn unsupported_codepoint_advances_without_emitting() {
        let font = test_font();
        // '\u{00e9}' (233) is outside [32, 126]
        let quads: Vec<_> = font.layout("A\u{00e9}B", 0.0, 0.0, 1.0).collect();

        assert_eq!(quads.len(), 2);
        // B shifted by A's advance plus the fallback half-line-height
        assert_eq!(quads[1].position[0], 10.0 + 4.0 + 2.0);
    }

    #[test]
    fn missing_glyph_in_range_is_skipped_without_advance() {
        let font = test_font();
        // 'C' is in range but has no glyph entry
        let quads: Vec<_> = font.layout("ACB", 0.0, 0.0, 1.0).collect();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].position[0], 10.0 + 2.0);
    }

    #[test]
    fn layout_is_restartable() {
        let font = test_font();
        let a: Vec<_> = font.layout("AB", 5.0, 5.0, 1.0).collect();
        let b: Vec<_> = font.layout("AB", 5.0, 5.0, 1.0).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn measure_matches_layout_advance() {
        let font = test_font();
        assert_eq!(font.measure("AB", 1.0), 22.0);
        assert_eq!(font.measure("A\u{00e9}", 1.0), 14.0);
    }

    #[test]
    fn descriptor_parses_with_defaults() {
        let json = r#"{
            "atlasSize": 512,
            "glyphs": {
                "65": { "advance": 10.5, "bearingX": 1.0, "bearingY": 9.0,
                        "w": 8, "h": 10, "u0": 0.0, "v0": 0.1, "u1": 0.2, "v1": 0.3 },
                "66": { "advance": 11.0 }
            }
        }"#;
        let descriptor: FontDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.atlas_size, 512);
        assert_eq!(descriptor.glyphs.len(), 2);
        assert_eq!(descriptor.glyphs["65"].advance, 10.5);
        assert_eq!(descriptor.glyphs["66"].u1, 1.0); // default
    }
}
