//! The batch accumulator: buckets submissions by atlas and plans draw calls.
//!
//! A `SpriteBatcher` is an explicitly owned object, never a singleton, so an
//! application can run one per render pass against a shared
//! [`AtlasRegistry`](super::atlas::AtlasRegistry). The CPU side of `end` is
//! split out as [`drain`](SpriteBatcher::drain), which produces a
//! [`DrawPlan`] the renderer executes; the split keeps chunking and ordering
//! testable without a GPU device.

use std::ops::Range;

use ahash::AHashMap;
use glam::Mat4;

use super::atlas::AtlasId;
use super::instance::SpriteInstance;

/// Which shader and blend family a batch renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchKind {
    /// Opaque-blended atlas sprites, with optional shadow/mask passes.
    Sprite,
    /// MSDF text; sets the tint color uniform.
    Font,
}

/// One instanced draw call in a plan: a contiguous range of instances, all
/// from the same atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub atlas: AtlasId,
    pub range: Range<u32>,
}

/// Everything the draw emitter needs for one batch: the packed instance
/// records and the calls that cover them.
pub struct DrawPlan {
    pub kind: BatchKind,
    pub projection: Mat4,
    pub instances: Vec<SpriteInstance>,
    pub calls: Vec<DrawCall>,
}

impl DrawPlan {
    /// True when the plan requires no upload and no draw calls.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Collects per-sprite draw records between `begin` and `drain`.
pub struct SpriteBatcher {
    buckets: AHashMap<AtlasId, Vec<SpriteInstance>>,
    projection: Mat4,
    kind: BatchKind,
    open: bool,
}

impl Default for SpriteBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteBatcher {
    pub fn new() -> Self {
        Self {
            buckets: AHashMap::new(),
            projection: Mat4::IDENTITY,
            kind: BatchKind::Sprite,
            open: false,
        }
    }

    /// Open a batch, clearing anything left from the previous one.
    pub fn begin(&mut self, projection: Mat4, kind: BatchKind) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        self.projection = projection;
        self.kind = kind;
        self.open = true;
    }

    /// Append a record to the bucket for `atlas`.
    ///
    /// A `None` atlas or a closed batch drops the record silently: entities
    /// routinely submit before their sheet finishes loading, and that is
    /// not an actionable error.
    pub fn submit(&mut self, atlas: Option<AtlasId>, instance: SpriteInstance) {
        if !self.open {
            return;
        }
        let Some(atlas) = atlas else {
            return;
        };
        self.buckets.entry(atlas).or_default().push(instance);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    /// Records submitted since `begin`.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the batch and pack it into a [`DrawPlan`].
    ///
    /// Buckets larger than `max_instances_per_draw` are split into multiple
    /// calls rather than failing, so GPU-side capacity overflow is never
    /// reachable. Submission order is preserved within each atlas; the
    /// order of atlases follows bucket iteration and carries no guarantee.
    pub fn drain(&mut self, max_instances_per_draw: u32) -> DrawPlan {
        let max = max_instances_per_draw.max(1);
        let mut plan = DrawPlan {
            kind: self.kind,
            projection: self.projection,
            instances: Vec::with_capacity(self.len()),
            calls: Vec::new(),
        };

        if !self.open {
            return plan;
        }
        self.open = false;

        for (&atlas, bucket) in &mut self.buckets {
            if bucket.is_empty() {
                continue;
            }

            let mut start = plan.instances.len() as u32;
            plan.instances.extend_from_slice(bucket);
            let end = plan.instances.len() as u32;
            bucket.clear();

            while start < end {
                let len = (end - start).min(max);
                plan.calls.push(DrawCall {
                    atlas,
                    range: start..start + len,
                });
                start += len;
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> AtlasId {
        AtlasId::from_raw(n)
    }

    fn inst(x: f32) -> SpriteInstance {
        SpriteInstance::full([x, 0.0], [1.0, 1.0])
    }

    #[test]
    fn submit_outside_open_batch_is_dropped() {
        let mut batcher = SpriteBatcher::new();
        batcher.submit(Some(id(0)), inst(1.0));
        assert!(batcher.is_empty());

        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        batcher.submit(Some(id(0)), inst(1.0));
        assert_eq!(batcher.len(), 1);
    }

    #[test]
    fn none_atlas_is_dropped() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        batcher.submit(None, inst(1.0));
        assert!(batcher.is_empty());
    }

    #[test]
    fn empty_batch_drains_to_empty_plan() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        let plan = batcher.drain(1000);
        assert!(plan.is_empty());
        assert!(plan.calls.is_empty());
        assert!(!batcher.is_open());
    }

    #[test]
    fn drain_closes_the_batch() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        batcher.submit(Some(id(0)), inst(1.0));
        batcher.drain(1000);

        // Closed: further submissions are dropped until the next begin
        batcher.submit(Some(id(0)), inst(2.0));
        assert!(batcher.is_empty());
    }

    #[test]
    fn begin_clears_previous_contents() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        batcher.submit(Some(id(0)), inst(1.0));
        batcher.begin(Mat4::IDENTITY, BatchKind::Font);
        assert!(batcher.is_empty());
        assert_eq!(batcher.kind(), BatchKind::Font);
    }

    #[test]
    fn submission_order_preserved_within_atlas() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        for i in 0..100 {
            batcher.submit(Some(id(7)), inst(i as f32));
        }

        let plan = batcher.drain(1000);
        assert_eq!(plan.calls.len(), 1);
        for (i, instance) in plan.instances.iter().enumerate() {
            assert_eq!(instance.position[0], i as f32);
        }
    }

    #[test]
    fn oversized_bucket_splits_into_chunks() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        for i in 0..2500 {
            batcher.submit(Some(id(1)), inst(i as f32));
        }

        let plan = batcher.drain(1000);
        assert_eq!(plan.calls.len(), 3); // 1000 + 1000 + 500
        assert_eq!(plan.calls[0].range, 0..1000);
        assert_eq!(plan.calls[1].range, 1000..2000);
        assert_eq!(plan.calls[2].range, 2000..2500);
        for call in &plan.calls {
            assert!(call.range.len() <= 1000);
        }

        // Chunks cover every record in submission order
        for (i, instance) in plan.instances.iter().enumerate() {
            assert_eq!(instance.position[0], i as f32);
        }
    }

    #[test]
    fn multiple_atlases_get_separate_calls() {
        let mut batcher = SpriteBatcher::new();
        batcher.begin(Mat4::IDENTITY, BatchKind::Sprite);
        batcher.submit(Some(id(1)), inst(1.0));
        batcher.submit(Some(id(2)), inst(2.0));
        batcher.submit(Some(id(1)), inst(3.0));

        let plan = batcher.drain(1000);
        assert_eq!(plan.calls.len(), 2);
        assert_eq!(plan.instances.len(), 3);

        // Each call's range holds only its own atlas's records, in order
        for call in &plan.calls {
            let slice =
                &plan.instances[call.range.start as usize..call.range.end as usize];
            if call.atlas == id(1) {
                assert_eq!(slice[0].position[0], 1.0);
                assert_eq!(slice[1].position[0], 3.0);
            } else {
                assert_eq!(slice[0].position[0], 2.0);
            }
        }
    }
}
