//! Integration Tests for casesheet
//!
//! LLM応答の解析からレポートの生成・読み戻しまでを通して検証します。
//! 生成したXLSXは`ReportInspector`で読み戻し、値・書式・レイアウトを確認します。

use casesheet::{
    interpret, layout, CellRange, Interpretation, ReportCompiler, ReportCompilerBuilder,
    ReportInspector, ReportMeta, ReportSnapshot, Session, SessionConfig, TestCaseRecord,
    TestCaseStore,
};
use chrono::DateTime;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    pub fn generated_at() -> ReportMeta {
        ReportMeta::new(DateTime::parse_from_rfc3339("2025-06-01T10:20:30+09:00").unwrap())
    }

    pub fn compiler() -> ReportCompiler {
        ReportCompilerBuilder::new().build().unwrap()
    }

    pub fn records(n: usize) -> Vec<TestCaseRecord> {
        (1..=n)
            .map(|i| {
                TestCaseRecord::new(
                    format!("TC{:03}", i),
                    format!("Scenario {}", i),
                    format!("1. Open page {}\n2. Submit", i),
                    format!("Result {}", i),
                )
            })
            .collect()
    }

    pub fn compile_and_inspect(records: &[TestCaseRecord], meta: &ReportMeta) -> ReportSnapshot {
        let bytes = compiler().compile(records, meta).unwrap();
        ReportInspector::inspect(&bytes).unwrap()
    }
}

// ============================================================================
// 応答の解析からレポートまで
// ============================================================================

#[test]
fn test_reply_to_report_pipeline() {
    let reply = r#"Sure! Here are the login scenarios:
[
  {"id":"TC001","description":"Valid login","steps":"Enter valid credentials","expected_result":"Dashboard is shown"},
  {"id":"TC002","description":"Invalid password","steps":["Enter wrong password","Submit"],"expected":"Error banner"}
]
Let me know if you need more."#;

    let interpretation = interpret(reply);
    assert_eq!(
        interpretation.display_text(),
        "Sure! Here are the login scenarios:\n\nLet me know if you need more."
    );

    let mut store = TestCaseStore::new();
    store.append(interpretation.records().unwrap().iter().cloned());
    assert_eq!(store.len(), 2);

    let snapshot = fixtures::compile_and_inspect(store.records(), &fixtures::generated_at());

    assert_eq!(snapshot.sheet_name(), "Test Strategy");
    assert_eq!(
        snapshot.row_values(4),
        &["TC001", "Valid login", "Enter valid credentials", "Dashboard is shown", "", "PENDING"]
    );
    assert_eq!(
        snapshot.row_values(5),
        &["TC002", "Invalid password", "Enter wrong password\nSubmit", "Error banner", "", "PENDING"]
    );
    assert_eq!(snapshot.row_count(), 6);
}

#[test]
fn test_unparsed_reply_leaves_store_untouched() {
    let interpretation = interpret("Hello! How can I help you test today?");
    assert!(matches!(interpretation, Interpretation::Unparsed { .. }));

    let mut store = TestCaseStore::new();
    if let Some(records) = interpretation.records() {
        store.append(records.iter().cloned());
    }
    assert!(store.is_empty());
}

#[test]
fn test_session_accumulates_across_turns() {
    let mut session = Session::new(SessionConfig {
        api_key: "gsk_test".to_string(),
        target_scope: "https://app.qa-server.com".to_string(),
        include_scope: false,
        ..SessionConfig::default()
    });

    session.prepare_request("Login flow").unwrap();
    session.receive_response(r#"[{"id":"TC001","description":"a","steps":"s","expected_result":"r"}]"#);
    session.prepare_request("And checkout").unwrap();
    session.receive_response(r#"Done: [{"id":"TC002","description":"b","steps":"s","expected_result":"r"}]"#);

    let at = DateTime::parse_from_rfc3339("2025-06-01T10:20:30+09:00").unwrap();
    let bytes = session.export(&fixtures::compiler(), at).unwrap();
    let snapshot = ReportInspector::inspect(&bytes).unwrap();

    assert_eq!(snapshot.cell_text(4, 0), "TC001");
    assert_eq!(snapshot.cell_text(5, 0), "TC002");
    assert_eq!(
        snapshot.cell_text(1, 0),
        "Generated: 2025-06-01 10:20:30 | Agent: TestGen Pro Premium | Scope: https://app.qa-server.com"
    );
}

// ============================================================================
// レイアウト
// ============================================================================

#[test]
fn test_title_and_meta_bands() {
    let snapshot = fixtures::compile_and_inspect(
        &fixtures::records(1),
        &fixtures::generated_at().with_scope("https://staging.example.com"),
    );

    assert_eq!(snapshot.cell_text(0, 0), "TESTGEN PRO | TEST STRATEGY DOCUMENT");
    assert_eq!(
        snapshot.cell_text(1, 0),
        "Generated: 2025-06-01 10:20:30 | Agent: TestGen Pro Premium | Scope: https://staging.example.com"
    );
    assert_eq!(snapshot.row_values(2).iter().filter(|v| !v.is_empty()).count(), 0);

    let merged = snapshot.merged_ranges();
    assert!(merged.contains(&CellRange::parse_a1("A1:F1").unwrap()));
    assert!(merged.contains(&CellRange::parse_a1("A2:F2").unwrap()));
    assert_eq!(merged.len(), 2);

    assert_eq!(snapshot.row_height(0), Some(40.0));
    assert_eq!(snapshot.row_height(1), Some(25.0));

    let title = snapshot.style(0, 0).unwrap();
    assert_eq!(title.font.name.as_deref(), Some("Arial Black"));
    assert_eq!(title.font.size, Some(16.0));
    assert_eq!(title.font.color.as_deref(), Some("FFFFFF"));
    assert_eq!(title.fill.as_deref(), Some("1A73E8"));
    assert_eq!(title.horizontal.as_deref(), Some("center"));
    assert_eq!(title.vertical.as_deref(), Some("center"));

    let meta = snapshot.style(1, 0).unwrap();
    assert!(meta.font.italic);
    assert_eq!(meta.font.size, Some(10.0));
    assert_eq!(meta.font.color.as_deref(), Some("666666"));
    assert_eq!(meta.fill, None);
}

#[test]
fn test_scope_fallback_in_meta_band() {
    let snapshot = fixtures::compile_and_inspect(&[], &fixtures::generated_at());
    assert!(snapshot
        .cell_text(1, 0)
        .ends_with("| Scope: Internal Environment"));
}

#[test]
fn test_header_row() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(1), &fixtures::generated_at());

    assert_eq!(
        snapshot.row_values(3),
        &[
            "Case ID",
            "Requirement / Scenario",
            "Execution Steps",
            "Expected Result",
            "Actual Result",
            "Status"
        ]
    );
    assert_eq!(snapshot.row_height(3), Some(30.0));

    for col in 0..=5 {
        let style = snapshot.style(3, col).unwrap();
        assert!(style.font.bold, "header column {} should be bold", col);
        assert_eq!(style.font.size, Some(11.0));
        assert_eq!(style.font.color.as_deref(), Some("FFFFFF"));
        assert_eq!(style.fill.as_deref(), Some("34A853"));
        assert!(style.thin_border);
        assert_eq!(style.horizontal.as_deref(), Some("center"));
    }
}

#[test]
fn test_column_widths_are_fixed() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(1), &fixtures::generated_at());

    for (col, spec) in layout::COLUMNS.iter().enumerate() {
        let width = snapshot.column_width(col as u32).unwrap();
        // XLSX上の値には文字の余白分が加算される
        assert!(
            width >= spec.width && width < spec.width + 1.0,
            "column {} width {} should be about {}",
            col,
            width,
            spec.width
        );
    }
}

#[test]
fn test_zebra_striping_and_cell_formats() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(4), &fixtures::generated_at());

    for index in 0..4u32 {
        let row = 4 + index;
        let expected_fill = if index % 2 == 1 { Some("F8F9FA") } else { None };

        for col in 0..=4 {
            let style = snapshot.style(row, col).unwrap();
            assert_eq!(style.fill.as_deref(), expected_fill, "cell ({}, {})", row, col);
            assert!(style.thin_border);
            assert!(style.wrap);
            assert_eq!(style.vertical.as_deref(), Some("top"));
            assert!(!style.font.bold);
        }

        let status = snapshot.style(row, 5).unwrap();
        assert!(status.font.bold);
        assert!(status.thin_border);
        assert_eq!(status.horizontal.as_deref(), Some("center"));
        assert_eq!(status.fill.as_deref(), expected_fill);
    }
}

#[test]
fn test_actual_result_column_is_blank() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(3), &fixtures::generated_at());
    for row in 4..7 {
        assert_eq!(snapshot.cell_text(row, 4), "");
        assert!(snapshot.style(row, 4).is_some());
        assert_eq!(snapshot.cell_text(row, 5), "PENDING");
    }
}

#[test]
fn test_status_validation_covers_data_rows() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(3), &fixtures::generated_at());

    assert_eq!(snapshot.validations().len(), 1);
    let rule = &snapshot.validations()[0];
    assert_eq!(rule.kind, "list");
    assert!(rule.allow_blank);
    assert_eq!(rule.choices, vec!["PASS", "FAIL", "BLOCKED", "PENDING"]);
    assert_eq!(rule.ranges, vec![CellRange::parse_a1("F5:F7").unwrap()]);

    assert!(snapshot.validation_at(4, 5).is_some());
    assert!(snapshot.validation_at(6, 5).is_some());
    assert!(snapshot.validation_at(7, 5).is_none());
    assert!(snapshot.validation_at(3, 5).is_none());
    assert!(snapshot.validation_at(4, 4).is_none());
}

#[test]
fn test_autofilter_and_frozen_header() {
    let snapshot = fixtures::compile_and_inspect(&fixtures::records(2), &fixtures::generated_at());
    assert_eq!(snapshot.autofilter(), CellRange::parse_a1("A4:F4"));
    assert_eq!(snapshot.frozen_rows(), Some(4));
}

#[test]
fn test_custom_configuration() {
    let compiler = ReportCompilerBuilder::new()
        .with_title("ACME QA PLAN")
        .with_agent_label("ACME Bot")
        .with_scope_fallback("Local")
        .with_sheet_name("Plan")
        .with_timestamp_format("%Y/%m/%d")
        .build()
        .unwrap();

    let bytes = compiler.compile(&[], &fixtures::generated_at()).unwrap();
    let snapshot = ReportInspector::inspect(&bytes).unwrap();

    assert_eq!(snapshot.sheet_name(), "Plan");
    assert_eq!(snapshot.cell_text(0, 0), "ACME QA PLAN");
    assert_eq!(
        snapshot.cell_text(1, 0),
        "Generated: 2025/06/01 | Agent: ACME Bot | Scope: Local"
    );
}

// ============================================================================
// 決定性と保存
// ============================================================================

#[test]
fn test_compile_is_idempotent() {
    let records = fixtures::records(5);
    let meta = fixtures::generated_at().with_scope("https://app.qa-server.com");

    let first = fixtures::compile_and_inspect(&records, &meta);
    let second = fixtures::compile_and_inspect(&records, &meta);
    assert_eq!(first, second);
}

#[test]
fn test_compile_does_not_consume_store() {
    let mut store = TestCaseStore::new();
    store.append(fixtures::records(2));

    fixtures::compiler()
        .compile(store.records(), &fixtures::generated_at())
        .unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_save_uses_report_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00.123+00:00").unwrap();
    let meta = ReportMeta::new(at);

    let path = fixtures::compiler()
        .save(&fixtures::records(1), &meta, dir.path())
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "TestGen_Report_1704067200123.xlsx"
    );
    let snapshot = ReportInspector::inspect_reader(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(snapshot.cell_text(4, 0), "TC001");
}

#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let result = fixtures::compiler().save(&[], &fixtures::generated_at(), &missing);
    assert!(matches!(result, Err(casesheet::CaseSheetError::Io(_))));
}
