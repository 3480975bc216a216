//!
//! Every signal of a batch can have its own degree.
//!
//! This walks through how a batch is solved, what happens when the shared design matrix
//! cannot be solved, and how to keep a fit around for later.
//!
use ndarray::{array, Array2};
use polybatch::{
    fit, fit_with, EvalLayout, FitMode, FitOptions, FitResult, SampleSet, SignalAxis,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    //
    // Four readings of three sensors - one per row this time
    let positions = [0.0, 1.0, 2.0, 3.0];
    let readings = array![
        [1.0, 2.0, 3.0, 4.0],    // linear
        [1.0, 8.0, 27.0, 64.0],  // cubic
        [5.0, 5.1, 4.9, 5.0],    // flat
    ];
    let samples = SampleSet::table(&positions, readings.view(), SignalAxis::Rows)?;

    //
    // The same degree for everyone: a single decomposition solves the whole batch
    let shared = fit(&samples, 2)?;
    println!("degree 2 for all: {:?}\n{shared}\n", shared.mode());

    //
    // A degree per signal: each signal is solved against its own slice of one shared basis
    let mixed = fit(&samples, [1, 3, 0])?;
    println!("degrees [1, 3, 0]: {:?}\n{mixed}\n", mixed.mode());
    println!("packed coefficients: {:?}", mixed.coefficients());
    println!("offsets: {:?}, counts: {:?}\n", mixed.offsets(), mixed.coefficient_counts());

    //
    // Queries can be any shape. A 2x2 grid gives a (4, 3) table: one row per query, one column per signal
    let grid = array![[0.5, 1.5], [2.5, 3.5]];
    let y = mixed.evaluate(&grid)?;
    println!("grid evaluation, shape {:?}:\n{y}\n", y.shape());

    //
    // The table layout is available for single signals too
    let single = fit(&SampleSet::single(&positions, &[0.0, 1.0, 4.0, 9.0])?, 2)?;
    let table = single.evaluate_with_layout(&grid, EvalLayout::Table)?;
    println!("single signal as a table, shape {:?}\n", table.shape());

    //
    // Samples taken at a single instant cannot pin down a slope.
    // The shared solve fails for the whole batch; per-signal solves say which signal failed
    let stuck = [2.0, 2.0, 2.0];
    let stuck_readings = Array2::from_elem((3, 2), 1.0);
    let stuck_samples = SampleSet::table(&stuck, stuck_readings.view(), SignalAxis::Columns)?;

    if let Err(e) = fit(&stuck_samples, 1) {
        println!("shared solve: {e}");

        let options = FitOptions::new().with_mode(FitMode::HeterogeneousDegreeBatch);
        if let Err(e) = fit_with(&stuck_samples, 1, &options) {
            println!("per-signal solve: {e} (signal {:?})", e.failed_signal());
        }

        //
        // Dropping to a constant always works
        let fallback = fit(&stuck_samples, 0)?;
        println!("fallback: {fallback}\n");
    }

    //
    // Fits can be persisted. Loading one re-checks its layout
    let json = serde_json::to_string_pretty(&mixed)?;
    let restored: FitResult = serde_json::from_str(&json)?;
    assert_eq!(restored, mixed);
    println!("restored from {} bytes of JSON", json.len());

    Ok(())
}
