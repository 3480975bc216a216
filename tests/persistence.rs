use ndarray::array;
use polybatch::{
    assert_all_close, fit, fit_with, DegreeSpec, ErrorKind, FitOptions, FitResult, SampleSet,
    SignalAxis,
};

fn orbit_like_fit(centered: bool) -> FitResult {
    let t = [0.0, 60.0, 120.0, 180.0, 240.0, 300.0];
    let xyz = array![
        [7000.0, 0.0, 10.0],
        [6990.1, 450.2, 12.5],
        [6960.7, 899.0, 15.1],
        [6911.4, 1345.8, 17.4],
        [6843.0, 1788.6, 20.2],
        [6755.9, 2226.5, 22.6],
    ];
    let samples = SampleSet::table(&t, xyz.view(), SignalAxis::Columns).unwrap();
    let options = FitOptions::new().with_centering(centered);
    fit_with(&samples, [3, 3, 1], &options).unwrap()
}

#[test]
fn fit_survives_a_json_round_trip() {
    for centered in [false, true] {
        let original = orbit_like_fit(centered);
        let json = serde_json::to_string(&original).unwrap();
        let restored: FitResult = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored.residual_rms(), original.residual_rms());

        let query = array![30.0, 150.0, 290.0];
        assert_all_close!(
            restored.evaluate(&query).unwrap(),
            original.evaluate(&query).unwrap()
        );
    }
}

#[test]
fn corrupt_documents_are_rejected() {
    let original = orbit_like_fit(false);
    let mut doc = serde_json::to_value(&original).unwrap();

    // Drop one coefficient
    let mut short = doc.clone();
    short["coefficients"].as_array_mut().unwrap().pop();
    let err = serde_json::from_value::<FitResult>(short).unwrap_err();
    assert!(err.to_string().contains("coefficient"), "{err}");

    // Counts that do not match the degrees
    let mut counts = doc.clone();
    counts["coefficient_counts"] = serde_json::json!([4, 4, 4]);
    assert!(serde_json::from_value::<FitResult>(counts).is_err());

    // Fewer degrees than signals
    let mut degrees = doc.clone();
    degrees["degrees"] = serde_json::json!([3, 3]);
    assert!(serde_json::from_value::<FitResult>(degrees).is_err());

    // A shared-degree mode on a mixed-degree layout
    doc["mode"] = serde_json::json!("SharedDegreeBatch");
    assert!(serde_json::from_value::<FitResult>(doc).is_err());
}

#[test]
fn documents_without_diagnostics_still_load() {
    let original = orbit_like_fit(false);
    let mut doc = serde_json::to_value(&original).unwrap();
    doc.as_object_mut().unwrap().remove("residual_rms");

    let restored: FitResult = serde_json::from_value(doc).unwrap();
    assert!(restored.residual_rms().is_none());
    assert_eq!(restored.coefficients(), original.coefficients());
}

#[test]
fn packed_coefficients_rebuild_a_fit() {
    let original = orbit_like_fit(false);
    let rebuilt = FitResult::from_parts(
        original.signal_count(),
        original.degrees().clone(),
        original.coefficients().to_vec(),
        original.position_range(),
        None,
    )
    .unwrap();

    assert_eq!(rebuilt.mode(), original.mode());
    assert_eq!(rebuilt.offsets(), vec![0, 4, 8]);
    assert_all_close!(
        rebuilt.evaluate_scalar(100.0).unwrap(),
        original.evaluate_scalar(100.0).unwrap()
    );

    let err = FitResult::from_parts(3, DegreeSpec::from([3, 3, 1]), vec![0.0; 9], 0.0..=1.0, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);

    let err = FitResult::from_parts(2, [3, 3, 1], vec![0.0; 10], 0.0..=1.0, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn degree_specs_serialize_compactly() {
    assert_eq!(serde_json::to_string(&DegreeSpec::from(2)).unwrap(), "2");
    assert_eq!(
        serde_json::to_string(&DegreeSpec::from([1, 3])).unwrap(),
        "[1,3]"
    );

    let fit = {
        let t = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        let samples = SampleSet::single(&t, &y).unwrap();
        fit(&samples, 1).unwrap()
    };
    let doc = serde_json::to_value(&fit).unwrap();
    assert_eq!(doc["degrees"], serde_json::json!(1));
    assert_eq!(doc["mode"], serde_json::json!("SingleSeries"));
}
