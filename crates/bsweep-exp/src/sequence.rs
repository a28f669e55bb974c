use bsweep_core::errors::SweepError;
use bsweep_core::SweepPoint;

use crate::config::{Spacing, SweepConfig};

/// Size produced by generator step `step` (`1..step_count`).
pub(crate) fn size_at(config: &SweepConfig, step: u32) -> f64 {
    let fraction = f64::from(step) * (config.end - config.start) / f64::from(config.step_count);
    match config.spacing {
        Spacing::Geometric => 2f64.powf(config.start + fraction),
        Spacing::Linear => config.start + fraction,
    }
}

/// Produces the ordered sweep points for `config`.
///
/// Steps run from `1` to `step_count - 1`; step `0` (the lower bound itself)
/// is never emitted. With a secondary range every size is crossed with all
/// secondary values, size being the outer dimension. The returned iterator is
/// lazy, and calling `generate` again yields the identical sequence.
pub fn generate(config: &SweepConfig) -> Result<SweepPoints<'_>, SweepError> {
    if config.step_count == 0 {
        return Err(SweepError::config(
            "step-count",
            "step count must be positive",
        ));
    }
    config.validate_secondary()?;
    let secondary = config.secondary_values();
    Ok(SweepPoints {
        config,
        secondary,
        step: 1,
        slot: 0,
        index: 0,
    })
}

/// Lazy iterator over the points of a sweep.
#[derive(Debug, Clone)]
pub struct SweepPoints<'a> {
    config: &'a SweepConfig,
    secondary: Option<Vec<i64>>,
    step: u32,
    slot: usize,
    index: usize,
}

impl SweepPoints<'_> {
    fn width(&self) -> usize {
        self.secondary.as_ref().map_or(1, Vec::len)
    }
}

impl Iterator for SweepPoints<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<SweepPoint> {
        if self.step >= self.config.step_count {
            return None;
        }
        let secondary = self
            .secondary
            .as_ref()
            .map(|values| values[self.slot]);
        let point = SweepPoint {
            size: size_at(self.config, self.step),
            secondary,
            step: self.step,
            index: self.index,
        };
        self.index += 1;
        self.slot += 1;
        if self.slot >= self.width() {
            self.slot = 0;
            self.step += 1;
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining_steps = self.config.step_count.saturating_sub(self.step) as usize;
        let remaining = (remaining_steps * self.width()).saturating_sub(self.slot);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepPoints<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecondaryRange;

    #[test]
    fn step_zero_is_never_emitted() {
        let config = SweepConfig::new("./probe", 1.0, 3.0, 2);
        let points: Vec<_> = generate(&config).expect("generate").collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].size, 4.0);
        assert_eq!(points[0].step, 1);
        assert_eq!(points[0].index, 0);
    }

    #[test]
    fn zero_steps_is_a_config_error() {
        let config = SweepConfig::new("./probe", 1.0, 3.0, 0);
        assert!(matches!(generate(&config), Err(SweepError::Config(_))));
    }

    #[test]
    fn single_step_yields_nothing() {
        let config = SweepConfig::new("./probe", 1.0, 3.0, 1);
        assert_eq!(generate(&config).expect("generate").count(), 0);
    }

    #[test]
    fn secondary_is_the_inner_dimension() {
        let mut config = SweepConfig::new("./probe", 0.0, 4.0, 4);
        config.secondary = Some(SecondaryRange::Span { start: 0, end: 2 });
        let points: Vec<_> = generate(&config)
            .expect("generate")
            .map(|p| (p.size, p.secondary, p.index))
            .collect();
        assert_eq!(
            points,
            vec![
                (2.0, Some(0), 0),
                (2.0, Some(1), 1),
                (4.0, Some(0), 2),
                (4.0, Some(1), 3),
                (8.0, Some(0), 4),
                (8.0, Some(1), 5),
            ]
        );
    }

    #[test]
    fn size_hint_tracks_progress() {
        let mut config = SweepConfig::new("./probe", 0.0, 4.0, 4);
        config.secondary = Some(SecondaryRange::Values(vec![7, 9]));
        let mut points = generate(&config).expect("generate");
        assert_eq!(points.len(), 6);
        points.next();
        assert_eq!(points.len(), 5);
        points.next();
        points.next();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn linear_spacing_walks_fixed_steps() {
        let mut config = SweepConfig::new("./probe", 0.0, 512.0, 4);
        config.spacing = Spacing::Linear;
        let sizes: Vec<_> = generate(&config).expect("generate").map(|p| p.size).collect();
        assert_eq!(sizes, vec![128.0, 256.0, 384.0]);
    }
}
