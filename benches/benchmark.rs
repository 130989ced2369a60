//! パフォーマンスベンチマーク
//!
//! このモジュールは、casesheetクレートのパフォーマンスを測定するためのベンチマークを提供します。
//!
//! 実装するベンチマーク:
//! - モデル応答の解析（バッチサイズ別）
//! - レポート生成（レコード数別）
//! - レポートの読み戻し

use casesheet::{interpret, ReportCompilerBuilder, ReportInspector, ReportMeta, TestCaseRecord};
use chrono::DateTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// `n`件のテストケースを含むモデル応答を生成
fn reply_with_cases(n: usize) -> String {
    let cases: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"id":"TC{:04}","description":"Scenario {}","steps":"1. Open page\n2. Submit","expected_result":"Result {}"}}"#,
                i, i, i
            )
        })
        .collect();
    format!("Sure, here you go:\n[{}]\nAnything else?", cases.join(","))
}

fn records(n: usize) -> Vec<TestCaseRecord> {
    (1..=n)
        .map(|i| {
            TestCaseRecord::new(
                format!("TC{:04}", i),
                format!("Scenario {}", i),
                "1. Open page\n2. Fill form\n3. Submit",
                format!("Result {}", i),
            )
        })
        .collect()
}

fn meta() -> ReportMeta {
    ReportMeta::new(DateTime::parse_from_rfc3339("2025-01-01T00:00:00+00:00").unwrap())
        .with_scope("https://app.qa-server.com")
}

fn benchmark_interpret(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpret");

    for n in [10usize, 100, 1_000] {
        let reply = reply_with_cases(n);
        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &reply, |b, reply| {
            b.iter(|| black_box(interpret(black_box(reply))));
        });
    }

    // 構造化データを含まない応答
    let chat = "Hello! I'm your QA assistant. ".repeat(100);
    group.throughput(Throughput::Bytes(chat.len() as u64));
    group.bench_function("unparsed_chat", |b| {
        b.iter(|| black_box(interpret(black_box(&chat))));
    });

    group.finish();
}

fn benchmark_compile(c: &mut Criterion) {
    let compiler = ReportCompilerBuilder::new().build().unwrap();
    let meta = meta();

    let mut group = c.benchmark_group("compile");
    group.sample_size(10);

    for n in [10usize, 100, 1_000] {
        let records = records(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| black_box(compiler.compile(black_box(records), &meta).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_inspect(c: &mut Criterion) {
    let compiler = ReportCompilerBuilder::new().build().unwrap();
    let bytes = compiler.compile(&records(1_000), &meta()).unwrap();

    let mut group = c.benchmark_group("inspect");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("report_1000_records", |b| {
        b.iter(|| black_box(ReportInspector::inspect(black_box(&bytes)).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_interpret,
    benchmark_compile,
    benchmark_inspect
);
criterion_main!(benches);
