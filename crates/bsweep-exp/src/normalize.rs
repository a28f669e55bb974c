use bsweep_core::AggregatedResult;

/// Converts absolute measurements into per-element rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateNormalizer {
    enabled: bool,
}

impl RateNormalizer {
    /// Creates a normalizer; a disabled one passes results through.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Divides every field by `size` when enabled.
    ///
    /// `size` comes from a generated sweep point and is therefore positive.
    pub fn normalize(&self, result: AggregatedResult, size: f64) -> AggregatedResult {
        if !self.enabled {
            return result;
        }
        debug_assert!(size > 0.0, "sweep sizes are positive by construction");
        result.map_values(|value| value / size)
    }
}
