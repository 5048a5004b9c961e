//! Texture atlases: grid geometry, GPU sheets, and the id-issuing registry.

use std::path::Path;

use ahash::AHashMap;

use crate::error::SheetError;
use crate::gpu::Texture;
use crate::renderer::SpriteRenderer;

/// Grid geometry of an atlas: a texture divided into same-sized tiles.
///
/// Constructing one validates the layout, so every live `AtlasGrid` has
/// positive tile dimensions that divide the texture exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasGrid {
    texture_width: u32,
    texture_height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl AtlasGrid {
    /// Derive tile size from tile counts, validating divisibility.
    pub fn from_tile_counts(
        texture_width: u32,
        texture_height: u32,
        count_x: u32,
        count_y: u32,
    ) -> Result<Self, SheetError> {
        if count_x == 0 || count_y == 0 {
            return Err(SheetError::ZeroTileCount { count_x, count_y });
        }

        let tile_width = texture_width / count_x;
        let tile_height = texture_height / count_y;

        if tile_width == 0
            || tile_height == 0
            || texture_width % tile_width != 0
            || texture_height % tile_height != 0
            || texture_width / tile_width != count_x
            || texture_height / tile_height != count_y
        {
            return Err(SheetError::NotDivisible {
                texture_width,
                texture_height,
                tile_width,
                tile_height,
            });
        }

        Ok(Self {
            texture_width,
            texture_height,
            tile_width,
            tile_height,
        })
    }

    pub fn texture_size(&self) -> (u32, u32) {
        (self.texture_width, self.texture_height)
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn columns(&self) -> u32 {
        self.texture_width / self.tile_width
    }

    pub fn rows(&self) -> u32 {
        self.texture_height / self.tile_height
    }

    pub fn tile_count(&self) -> u32 {
        self.columns() * self.rows()
    }

    /// Normalized UV rectangle (u0, v0, u1, v1) for a tile index.
    ///
    /// Tiles are row-major from the top-left; Glyph layout and the animation
    /// clock both depend on this ordering. Out-of-range indices clamp to the
    /// last tile: a wrong-but-visible tile beats interrupting the frame.
    pub fn tile_rect(&self, index: u32) -> [f32; 4] {
        let index = index.min(self.tile_count() - 1);
        let col = index % self.columns();
        let row = index / self.columns();

        let tex_w = self.texture_width as f32;
        let tex_h = self.texture_height as f32;

        let u0 = (col * self.tile_width) as f32 / tex_w;
        let v0 = (row * self.tile_height) as f32 / tex_h;
        let u1 = ((col + 1) * self.tile_width) as f32 / tex_w;
        let v1 = ((row + 1) * self.tile_height) as f32 / tex_h;

        [u0, v0, u1, v1]
    }
}

/// Overlay layers a sheet can carry for composite passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    /// Drawn after the base pass with alpha blending, tinted black-translucent.
    Shadow,
    /// Drawn after the base pass with multiplicative blending.
    Mask,
}

/// Stable handle to a loaded sheet, issued by [`AtlasRegistry`].
///
/// Used as the bucket key during batching so identity survives any
/// reallocation of the sheet storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtlasId(u32);

impl AtlasId {
    /// Rebuild a handle from its raw value.
    ///
    /// Normal code receives ids from [`AtlasRegistry`]; this exists for
    /// serialization and tests. An id the registry never issued is simply
    /// skipped at draw time.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A texture atlas on the GPU plus its grid geometry and optional overlays.
pub struct SpriteSheet {
    grid: AtlasGrid,
    #[allow(dead_code)] // Kept alive for the bind group
    texture: Texture,
    bind_group: wgpu::BindGroup,
    shadow: Option<(Texture, wgpu::BindGroup)>,
    mask: Option<(Texture, wgpu::BindGroup)>,
}

impl SpriteSheet {
    pub fn grid(&self) -> &AtlasGrid {
        &self.grid
    }

    /// Normalized UV rectangle for a tile index.
    pub fn tile_rect(&self, index: u32) -> [f32; 4] {
        self.grid.tile_rect(index)
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub(crate) fn shadow_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.shadow.as_ref().map(|(_, bg)| bg)
    }

    pub(crate) fn mask_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.mask.as_ref().map(|(_, bg)| bg)
    }
}

/// Owns all loaded sheets and issues [`AtlasId`] handles.
///
/// Read-only after loading, so one registry can back any number of
/// batchers (e.g. one per render pass).
#[derive(Default)]
pub struct AtlasRegistry {
    sheets: AHashMap<AtlasId, SpriteSheet>,
    next_id: u32,
}

impl AtlasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a sheet image, derive tile size from counts, and register it.
    ///
    /// Nearest-neighbor filtering, the right choice for pixel-art tiles.
    pub fn load_sheet(
        &mut self,
        renderer: &SpriteRenderer,
        path: &Path,
        count_x: u32,
        count_y: u32,
        flip_vertically: bool,
    ) -> Result<AtlasId, SheetError> {
        self.load_sheet_filtered(
            renderer,
            path,
            count_x,
            count_y,
            flip_vertically,
            wgpu::FilterMode::Nearest,
        )
    }

    /// Like [`load_sheet`](Self::load_sheet) with an explicit filter mode.
    /// MSDF font atlases need `Linear`.
    pub fn load_sheet_filtered(
        &mut self,
        renderer: &SpriteRenderer,
        path: &Path,
        count_x: u32,
        count_y: u32,
        flip_vertically: bool,
        filter: wgpu::FilterMode,
    ) -> Result<AtlasId, SheetError> {
        let texture = Texture::from_path(
            renderer.device(),
            renderer.queue(),
            path,
            flip_vertically,
            filter,
        )?;
        let grid =
            AtlasGrid::from_tile_counts(texture.width, texture.height, count_x, count_y)?;
        let bind_group = renderer.create_texture_bind_group(&texture, path.to_str());

        let id = AtlasId(self.next_id);
        self.next_id += 1;
        self.sheets.insert(
            id,
            SpriteSheet {
                grid,
                texture,
                bind_group,
                shadow: None,
                mask: None,
            },
        );

        tracing::info!(
            "Loaded sheet {:?}: {}x{} tiles of {}x{}px",
            path,
            count_x,
            count_y,
            self.sheets[&id].grid.tile_size().0,
            self.sheets[&id].grid.tile_size().1,
        );
        Ok(id)
    }

    /// Attach a shadow or mask layer sharing the sheet's tile grid.
    ///
    /// The overlay image must match the base sheet's pixel dimensions.
    /// Returns `Ok` exactly when loading succeeds.
    pub fn attach_overlay(
        &mut self,
        renderer: &SpriteRenderer,
        id: AtlasId,
        kind: OverlayKind,
        path: &Path,
        flip_vertically: bool,
    ) -> Result<(), SheetError> {
        let sheet = self
            .sheets
            .get(&id)
            .ok_or(SheetError::UnknownAtlas(id.raw()))?;
        let (want_width, want_height) = sheet.grid.texture_size();

        let texture = Texture::from_path(
            renderer.device(),
            renderer.queue(),
            path,
            flip_vertically,
            wgpu::FilterMode::Nearest,
        )?;
        if (texture.width, texture.height) != (want_width, want_height) {
            return Err(SheetError::OverlayDimensionMismatch {
                path: path.to_path_buf(),
                got_width: texture.width,
                got_height: texture.height,
                want_width,
                want_height,
            });
        }

        let bind_group = renderer.create_texture_bind_group(&texture, path.to_str());
        let sheet = self.sheets.get_mut(&id).expect("checked above");
        match kind {
            OverlayKind::Shadow => sheet.shadow = Some((texture, bind_group)),
            OverlayKind::Mask => sheet.mask = Some((texture, bind_group)),
        }
        Ok(())
    }

    pub fn get(&self, id: AtlasId) -> Option<&SpriteSheet> {
        self.sheets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Register a pre-built sheet. Used by loaders that assemble the
    /// texture themselves.
    pub(crate) fn insert(&mut self, sheet: SpriteSheet) -> AtlasId {
        let id = AtlasId(self.next_id);
        self.next_id += 1;
        self.sheets.insert(id, sheet);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_from_counts() {
        let grid = AtlasGrid::from_tile_counts(1024, 1024, 8, 8).unwrap();
        assert_eq!(grid.columns(), 8);
        assert_eq!(grid.rows(), 8);
        assert_eq!(grid.tile_count(), 64);
        assert_eq!(grid.tile_size(), (128, 128));
    }

    #[test]
    fn tile_rect_row_major_top_left() {
        let grid = AtlasGrid::from_tile_counts(1024, 1024, 8, 8).unwrap();
        // Index 9 -> column 1, row 1
        assert_eq!(grid.tile_rect(9), [0.125, 0.125, 0.25, 0.25]);
        assert_eq!(grid.tile_rect(0), [0.0, 0.0, 0.125, 0.125]);
    }

    #[test]
    fn tile_rect_clamps_out_of_range() {
        let grid = AtlasGrid::from_tile_counts(64, 64, 2, 2).unwrap();
        assert_eq!(grid.tile_rect(99), grid.tile_rect(3));
    }

    #[test]
    fn zero_counts_rejected() {
        assert!(matches!(
            AtlasGrid::from_tile_counts(64, 64, 0, 2),
            Err(SheetError::ZeroTileCount { .. })
        ));
    }

    #[test]
    fn non_divisible_rejected() {
        // 100 / 3 = 33 remainder 1
        assert!(matches!(
            AtlasGrid::from_tile_counts(100, 64, 3, 2),
            Err(SheetError::NotDivisible { .. })
        ));
    }

    #[test]
    fn rects_tile_the_unit_square() {
        let grid = AtlasGrid::from_tile_counts(256, 128, 8, 4).unwrap();
        let cols = grid.columns();

        for i in 0..grid.tile_count() {
            let [u0, v0, u1, v1] = grid.tile_rect(i);
            assert!(u0 < u1 && v0 < v1);

            // Each edge sits exactly on a grid line
            let col = i % cols;
            let row = i / cols;
            assert_eq!(u0, col as f32 / cols as f32);
            assert_eq!(u1, (col + 1) as f32 / cols as f32);
            assert_eq!(v0, row as f32 / grid.rows() as f32);
            assert_eq!(v1, (row + 1) as f32 / grid.rows() as f32);
        }

        // Corners of the full grid touch the unit square exactly
        assert_eq!(grid.tile_rect(0)[0], 0.0);
        assert_eq!(grid.tile_rect(0)[1], 0.0);
        let last = grid.tile_rect(grid.tile_count() - 1);
        assert_eq!(last[2], 1.0);
        assert_eq!(last[3], 1.0);
    }
}
