use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use polybatch::{
    eval::horner, fit_series, fit_with, value::SteppedValues, FitMode, FitOptions, FitResult,
    SampleSet, SignalAxis,
};
use std::hint::black_box;

const COEFS: [f64; 3] = [5.3, 3.0, 1.0];

fn gen_positions(n: f64) -> Vec<f64> {
    SteppedValues::new_unit(1.0..=n).collect()
}

fn gen_sample_data(n: f64) -> (Vec<f64>, Vec<f64>) {
    let positions = gen_positions(n);
    let values = positions.iter().map(|&x| horner(&COEFS, x)).collect();
    (positions, values)
}

/// `signals` columns, signal `j` scaled by `j + 1`.
fn gen_signal_table(positions: &[f64], signals: usize) -> Array2<f64> {
    Array2::from_shape_fn((positions.len(), signals), |(i, j)| {
        horner(&COEFS, positions[i]) * (j + 1) as f64
    })
}

fn fit(data: &(Vec<f64>, Vec<f64>), degree: usize) -> FitResult<f64> {
    fit_series(&data.0, &data.1, degree).expect("Failed to fit data")
}

fn fit_batch(positions: &[f64], table: &Array2<f64>, degrees: &[usize], mode: FitMode) -> FitResult<f64> {
    let samples = SampleSet::table(positions, table.view(), SignalAxis::Columns).expect("Invalid samples");
    let options = FitOptions::new().with_mode(mode);
    fit_with(&samples, degrees, &options).expect("Failed to fit batch")
}

fn criterion_benchmark(c: &mut Criterion) {
    //
    // First we test how the solver scales with data size
    println!("Benchmarking fit vs n (Degree=3)...");
    test_linear_criterion_group(
        c,
        "fit_vs_n",
        &[
            CriterionTestEntry::new("n=100", 1e2, gen_sample_data(1e2)),
            CriterionTestEntry::new("n=1_000", 1e3, gen_sample_data(1e3)),
            CriterionTestEntry::new("n=10_000", 1e4, gen_sample_data(1e4)),
            CriterionTestEntry::new("n=100_000", 1e5, gen_sample_data(1e5)),
        ],
        |b, data| b.iter(|| fit(black_box(data), 3)),
    );

    //
    // Now the same but scaling with degree
    println!("Benchmarking fit vs degree (n=1000)...");
    let samples = gen_sample_data(1e3);
    let mut group = c.benchmark_group("fit_vs_degree");
    for degree in [1, 2, 3, 4, 5, 10] {
        group.bench_function(format!("Degree={degree}"), |b| {
            b.iter(|| fit(black_box(&samples), degree))
        });
    }
    group.finish();

    //
    // One decomposition for every signal, against one solve per signal
    println!("Benchmarking shared vs per-signal batches (n=1000, Degree=3)...");
    let positions = gen_positions(1e3);
    let mut group = c.benchmark_group("shared_vs_per_signal");
    for signals in [3, 30, 300] {
        let table = gen_signal_table(&positions, signals);
        let degrees = vec![3; signals];
        group.bench_function(format!("shared/M={signals}"), |b| {
            b.iter(|| {
                fit_batch(
                    &positions,
                    black_box(&table),
                    &degrees,
                    FitMode::SharedDegreeBatch,
                )
            })
        });
        group.bench_function(format!("per_signal/M={signals}"), |b| {
            b.iter(|| {
                fit_batch(
                    &positions,
                    black_box(&table),
                    &degrees,
                    FitMode::HeterogeneousDegreeBatch,
                )
            })
        });
    }
    group.finish();

    //
    // Evaluation throughput of a three-signal fit
    println!("Benchmarking evaluation (M=3, Degrees=[1, 3, 5])...");
    let table = gen_signal_table(&positions, 3);
    let batch = fit_batch(&positions, &table, &[1, 3, 5], FitMode::HeterogeneousDegreeBatch);
    let mut group = c.benchmark_group("evaluate");
    for n in [1e2, 1e4, 1e6] {
        let query = Array1::from(gen_positions(n));
        group.bench_function(format!("n={n:e}"), |b| {
            b.iter(|| batch.evaluate(black_box(&query)).expect("Failed to evaluate"))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn get_data_for_run<V>(group_id: &str, tests: &[CriterionTestEntry<V>]) -> (Vec<f64>, Vec<f64>) {
    // Each test corresponds to a different x value in the series
    tests
        .iter()
        .map(|test| {
            let y = get_sample_for_run(group_id, &test.id);
            (test.x, y)
        })
        .unzip()
}

fn get_sample_for_run(group_id: &str, test_id: &str) -> f64 {
    #[derive(serde::Deserialize)]
    struct CriterionSamples {
        iters: Vec<f64>,
        times: Vec<f64>,
    }

    let raw = std::fs::read_to_string(format!(
        "target/criterion/{group_id}/{test_id}/new/sample.json"
    ))
    .expect("Failed to read sample data");
    let samples: CriterionSamples =
        serde_json::from_str(&raw).expect("Failed to parse sample data");

    samples
        .iters
        .iter()
        .zip(samples.times.iter())
        .map(|(i, t)| t / i)
        .sum::<f64>()
        / (samples.iters.len() as f64)
}

struct CriterionTestEntry<V> {
    id: String,
    x: f64,
    values: V,
}
impl<V> CriterionTestEntry<V> {
    pub fn new(id: &str, x: impl TryInto<f64>, values: V) -> Self {
        Self {
            id: id.to_string(),
            x: x.try_into().ok().expect("Failed to convert x to f64"),
            values,
        }
    }
}

fn test_linear_criterion_group<F, V>(
    c: &mut Criterion,
    id: &str,
    samples: &[CriterionTestEntry<V>],
    runner: F,
) where
    for<'a, 'b, 'c> F: Fn(&'a mut criterion::Bencher<'b>, &'c V),
{
    let mut group = c.benchmark_group(id);
    for sample in samples {
        group.bench_with_input(&sample.id, &sample.values, &runner);
    }
    group.finish();

    // Solve time should grow linearly with the sample count
    let (x, y) = get_data_for_run(id, samples);
    let data = SampleSet::single(&x, &y).expect("Invalid timing samples");
    let linear_fit = polybatch::fit(&data, 1).expect("Failed to fit timings");
    polybatch::assert_r_squared!(linear_fit, data);
}
