//! Batching configuration with documented constants
//!
//! The handful of tunables that affect draw-call shape and GPU memory are
//! collected here with explanations of their purpose.

/// Configuration for the batching engine
///
/// Defaults are tuned for the 100k-sprite stress scene; most applications
/// can use them unchanged.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum instances covered by a single instanced draw call
    ///
    /// Buckets larger than this are split into multiple draw calls rather
    /// than failing, so overflow is never observable by callers. Lowering
    /// it only increases draw-call count; it does not bound memory.
    pub max_instances_per_draw: u32,

    /// Initial capacity of the GPU instance buffer, in instances
    ///
    /// The buffer grows geometrically when a frame exceeds it, so this is
    /// a warm-up hint, not a limit. 32 bytes per instance.
    pub initial_instance_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_instances_per_draw: 200_000,
            initial_instance_capacity: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = BatchConfig::default();
        assert!(config.max_instances_per_draw > 0);
        assert!(config.initial_instance_capacity > 0);
    }
}
