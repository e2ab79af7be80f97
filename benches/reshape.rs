use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use ophys::{
    classify_responsivity, container_ids, segment_by_stimulus, CellSpecimen, CellSpecimenId,
    ContainerId, DffTraces, Epoch, EpochTable, ResponsivityConfig, SessionType,
};

fn specimens(n_containers: i64, per_container: i64) -> Vec<CellSpecimen> {
    let mut out = Vec::new();
    for c in 0..n_containers {
        for i in 0..per_container {
            let x = ((c * per_container + i) as f64 * 0.618).fract();
            out.push(CellSpecimen {
                cell_specimen_id: CellSpecimenId(c * 10_000 + i),
                experiment_container_id: ContainerId(c),
                p_dg: Some(x * 0.1),
                peak_dff_dg: Some(x * 6.0),
                p_sg: Some(1.0 - x),
                peak_dff_sg: Some(5.0 - x),
                p_ns: Some(x),
                peak_dff_ns: Some(x * 4.0),
                rf_chi2_lsn: Some(x * 0.2),
            });
        }
    }
    out
}

fn bench_classify(c: &mut Criterion) {
    let cells = specimens(20, 500);
    let containers = container_ids(&(0..20).collect::<Vec<i64>>());
    let cfg = ResponsivityConfig::default();
    c.bench_function("classify_responsivity [20 containers × 500 cells]", |b| {
        b.iter(|| {
            let cats = classify_responsivity(black_box(&containers), &cells, SessionType::B, &cfg).unwrap();
            black_box(cats.categories().len())
        })
    });
}

fn bench_segment(c: &mut Criterion) {
    let (n_cells, n_frames) = (200, 115_000);
    let traces = DffTraces::new(
        Array1::from_shape_fn(n_frames, |t| t as f64 / 30.0),
        Array2::from_elem((n_cells, n_frames), 0.1_f32),
    )
    .unwrap();
    let labels = ["static_gratings", "natural_scenes", "spontaneous", "natural_movie_one"];
    let table = EpochTable(
        (0..12)
            .map(|i| Epoch {
                stimulus: labels[i % labels.len()].to_string(),
                start: i * 9_000,
                end: i * 9_000 + 8_500,
            })
            .collect(),
    );
    c.bench_function("segment_by_stimulus [200×115000, 12 epochs]", |b| {
        b.iter(|| {
            let segs = segment_by_stimulus(black_box(&traces), &table).unwrap();
            black_box(segs.len())
        })
    });
}

criterion_group!(benches, bench_classify, bench_segment);
criterion_main!(benches);
