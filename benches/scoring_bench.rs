use a11yscore::{score_report, score_reports, Act, JobData, Report, ScoreProc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

/// A report exercising every adapter archetype.
fn synthetic_report(id: &str, findings_per_tool: usize) -> Report {
    let axe_items: Vec<_> = (0..findings_per_tool)
        .map(|i| json!({"id": "image-alt", "impact": "critical", "nodes": i % 4 + 1}))
        .collect();
    let alfa_items: Vec<_> = (0..findings_per_tool)
        .map(|_| json!({"verdict": "failed", "rule": {"ruleID": "r11"}}))
        .collect();
    let messages: Vec<_> = (0..findings_per_tool)
        .map(|i| json!({"type": "error", "message": format!("Duplicate ID id{i}.")}))
        .collect();
    let result_set: Vec<_> = (0..findings_per_tool)
        .map(|i| json!({"tID": 144, "certainty": 80, "priority": (i % 10 + 1) * 10}))
        .collect();
    Report::new(
        id,
        vec![
            Act::test("axe", json!({"violations": axe_items})),
            Act::test("alfa", json!({"items": alfa_items})),
            Act::test("nuVal", json!({"messages": messages})),
            Act::test("tenon", json!({"data": {"resultSet": result_set}})),
            Act::test(
                "wave",
                json!({"categories": {
                    "error": {"items": {"alt_missing": {"count": findings_per_tool}}},
                    "contrast": {"items": {"contrast": {"count": findings_per_tool}}}
                }}),
            ),
            Act::test(
                "probe",
                json!({"checks": [
                    {"id": "bulk", "count": 1200},
                    {"id": "focInd", "instances": findings_per_tool}
                ]}),
            ),
        ],
        JobData {
            log_count: 25,
            log_size: 12_000,
            error_log_count: 4,
            error_log_size: 900,
            prohibited_count: 0,
            visit_timeout_count: 0,
            visit_rejection_count: 0,
            visit_latency: 17.0,
        },
    )
}

fn bench_score_report(c: &mut Criterion) {
    let proc = ScoreProc::default_proc();
    let mut group = c.benchmark_group("score_report");
    for size in [10usize, 100, 500] {
        let report = synthetic_report("bench", size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &report, |b, report| {
            b.iter(|| score_report(black_box(report), proc).unwrap())
        });
    }
    group.finish();
}

fn bench_score_batch(c: &mut Criterion) {
    let proc = ScoreProc::default_proc();
    c.bench_function("score_reports_batch_64", |b| {
        let reports: Vec<Report> = (0..64)
            .map(|i| synthetic_report(&format!("bench-{i}"), 50))
            .collect();
        b.iter_batched(
            || reports.clone(),
            |mut reports| score_reports(black_box(&mut reports), proc),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_score_report, bench_score_batch);
criterion_main!(benches);
