//! Sprite-side types: atlases, instance records, animation, and batching.

pub mod animation;
pub mod atlas;
pub mod batch;
pub mod instance;
pub mod library;

pub use animation::{AnimationState, FrameSequence};
pub use atlas::{AtlasGrid, AtlasId, AtlasRegistry, OverlayKind, SpriteSheet};
pub use batch::{BatchKind, DrawCall, DrawPlan, SpriteBatcher};
pub use instance::SpriteInstance;
pub use library::{AnimationDef, AnimationLibrary};
