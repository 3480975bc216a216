//!
//! Tracking data for a satellite usually arrives as three signals over one clock:
//! the x, y and z components of its position.
//!
//! Here I fit all three at once, with a different degree for the out-of-plane component,
//! and use the fits to interpolate positions and velocities between the samples.
//!
use ndarray::{Array1, Array2};
use polybatch::{
    error::Error,
    fit_with,
    transforms::{ApplyNoise, Strength},
    value::SteppedValues,
    FitOptions, SampleSet, SignalAxis,
};

const RADIUS: f64 = 7000.0; // km
const RATE: f64 = 0.0011; // rad/s

fn main() -> Result<(), Error> {
    //
    // Ten minutes of samples, one every 30 seconds
    let t: Vec<f64> = SteppedValues::new(0.0..=600.0, 30.0).collect();
    let xyz = Array2::from_shape_fn((t.len(), 3), |(i, j)| {
        let phase = RATE * t[i];
        match j {
            0 => RADIUS * phase.cos(),
            1 => RADIUS * phase.sin(),
            _ => 15.0 + 0.01 * t[i],
        }
    });

    //
    // Real tracking data is noisy - about 50m of Gaussian noise on every component
    let xyz = xyz.apply_normal_noise(Strength::Absolute(0.05), Some(1234));

    //
    // In-plane components curve, the out-of-plane drift is close to linear.
    // The sample times are far from the polynomial origin at the end of the pass,
    // so I center the fit to keep the design matrix well conditioned.
    let samples = SampleSet::table(&t, xyz.view(), SignalAxis::Columns)?;
    let options = FitOptions::new().with_centering(true);
    let fit = fit_with(&samples, [5, 5, 1], &options)?;

    println!("Solved as {:?}", fit.mode());
    println!("{fit}");

    //
    // How well does each component fit?
    let r2 = fit.r_squared(&samples)?;
    if let Some(rms) = fit.residual_rms() {
        for (i, name) in ["x", "y", "z"].iter().enumerate() {
            println!("{name}: residual RMS = {:.4} km, R² = {:.6}", rms[i], r2[i]);
        }
    }

    //
    // Interpolate every 5 seconds. The output has one row per query time, one column per component
    let fine = Array1::from_iter(SteppedValues::new(0.0..=600.0, 5.0));
    let positions = fit.evaluate_within(&fine)?;
    let velocities = fit.evaluate_derivative(&fine)?;
    println!("Interpolated {} positions of shape {:?}", fine.len(), positions.shape());

    //
    // Orbital speed should stay close to R·ω
    let expected = RADIUS * RATE;
    for i in (0..fine.len()).step_by(24) {
        let (vx, vy) = (velocities[[i, 0]], velocities[[i, 1]]);
        let speed = vx.hypot(vy);
        println!(
            "t={:>5.1}s  x={:>9.3}  y={:>9.3}  |v|={speed:.4} km/s (expected {expected:.4})",
            fine[i],
            positions[[i, 0]],
            positions[[i, 1]],
        );
    }

    //
    // Extrapolation is allowed, but only when asked for explicitly
    let later = Array1::from(vec![900.0]);
    if let Err(e) = fit.evaluate_within(&later) {
        println!("{e}");
    }
    let predicted = fit.evaluate(&later)?;
    println!("Extrapolated to t=900s: {predicted}");

    Ok(())
}
