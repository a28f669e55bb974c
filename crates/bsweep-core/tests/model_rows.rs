use bsweep_core::{AggregatedResult, FieldValue, OutputRow, SweepPoint};

fn point() -> SweepPoint {
    SweepPoint {
        size: 4.0,
        secondary: Some(2),
        step: 1,
        index: 0,
    }
}

#[test]
fn map_values_keeps_names_and_order() {
    let result = AggregatedResult {
        point: point(),
        trial: None,
        fields: vec![FieldValue::new("setup", 10.0), FieldValue::new("run", 20.0)],
    };
    let halved = result.map_values(|value| value / 2.0);
    let names: Vec<_> = halved.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["setup", "run"]);
    assert_eq!(halved.get("run"), Some(10.0));
    assert_eq!(halved.get("missing"), None);
}

#[test]
fn output_row_carries_point_and_trial() {
    let result = AggregatedResult {
        point: point(),
        trial: Some(3),
        fields: vec![FieldValue::new("run", 7.5)],
    };
    let row = OutputRow::from(&result);
    assert_eq!(row.size, 4.0);
    assert_eq!(row.secondary, Some(2));
    assert_eq!(row.trial, Some(3));
    assert_eq!(row.values, vec![7.5]);
}
