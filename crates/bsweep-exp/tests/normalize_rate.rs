use bsweep_core::{AggregatedResult, FieldValue, SweepPoint};
use bsweep_exp::RateNormalizer;

fn result(run: f64) -> AggregatedResult {
    AggregatedResult {
        point: SweepPoint {
            size: 4.0,
            secondary: Some(9),
            step: 1,
            index: 0,
        },
        trial: None,
        fields: vec![FieldValue::new("run", run)],
    }
}

#[test]
fn divides_by_size() {
    let normalized = RateNormalizer::new(true).normalize(result(20.0), 4.0);
    assert_eq!(normalized.get("run"), Some(5.0));
}

#[test]
fn never_divides_by_the_secondary_parameter() {
    let normalized = RateNormalizer::new(true).normalize(result(18.0), 4.0);
    assert_eq!(normalized.get("run"), Some(4.5));
    assert_eq!(normalized.point.secondary, Some(9));
}

#[test]
fn disabled_passes_through() {
    let original = result(20.0);
    let normalized = RateNormalizer::new(false).normalize(original.clone(), 4.0);
    assert_eq!(normalized, original);
}
