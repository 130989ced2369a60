//! Builder Module
//!
//! Fluent Builder APIを提供し、`ReportCompiler`インスタンスを段階的に構築する。
//! `ReportCompiler`はテストケースレコードの列をテスト戦略シート（XLSX）に変換します。

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use rust_xlsxwriter::{DataValidation, Workbook, Worksheet};
use tracing::{info, warn};

use crate::api::Status;
use crate::error::CaseSheetError;
use crate::layout::{self, COLUMNS};
use crate::types::TestCaseRecord;

/// タイトル帯の既定テキスト
pub const DEFAULT_TITLE: &str = "TESTGEN PRO | TEST STRATEGY DOCUMENT";

/// メタデータ帯に表示するエージェント名
pub const DEFAULT_AGENT_LABEL: &str = "TestGen Pro Premium";

/// スコープ未設定時の表示
pub const DEFAULT_SCOPE_FALLBACK: &str = "Internal Environment";

pub const DEFAULT_SHEET_NAME: &str = "Test Strategy";

/// 生成日時の既定フォーマット（chrono互換）
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 出力ファイル名の接頭辞
pub const REPORT_FILE_PREFIX: &str = "TestGen_Report_";

pub const REPORT_FILE_EXTENSION: &str = ".xlsx";

/// シート名に使用できない文字
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Excelのシート名の最大文字数
const MAX_SHEET_NAME_LEN: usize = 31;

/// 1セルに格納できる最大文字数
pub const MAX_CELL_CHARS: usize = 32_767;

/// セルの上限文字数で切り詰める（文字境界で切る）
fn fit_cell_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => &value[..cut],
        None => value,
    }
}

/// 出力ファイル名を生成する（`TestGen_Report_<エポックミリ秒>.xlsx`）
pub fn report_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!(
        "{}{}{}",
        REPORT_FILE_PREFIX,
        at.timestamp_millis(),
        REPORT_FILE_EXTENSION
    )
}

/// レポート生成時のセッション情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    /// 生成日時
    pub generated_at: DateTime<FixedOffset>,

    /// 対象スコープ（未設定・空文字列の場合はフォールバック表示）
    pub scope_label: Option<String>,
}

impl ReportMeta {
    pub fn new(generated_at: DateTime<FixedOffset>) -> Self {
        Self {
            generated_at,
            scope_label: None,
        }
    }

    /// 現在時刻（ローカルタイムゾーン）で生成
    pub fn now() -> Self {
        Self::new(Local::now().fixed_offset())
    }

    pub fn with_scope(mut self, scope_label: impl Into<String>) -> Self {
        self.scope_label = Some(scope_label.into());
        self
    }
}

/// レポート生成の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ReportConfig {
    /// タイトル帯のテキスト
    pub title: String,

    /// メタデータ帯のエージェント名
    pub agent_label: String,

    /// スコープ未設定時の表示
    pub scope_fallback: String,

    /// シート名
    pub sheet_name: String,

    /// 生成日時のフォーマット
    pub timestamp_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            agent_label: DEFAULT_AGENT_LABEL.to_string(),
            scope_fallback: DEFAULT_SCOPE_FALLBACK.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use casesheet::ReportCompilerBuilder;
///
/// # fn main() -> Result<(), casesheet::CaseSheetError> {
/// let compiler = ReportCompilerBuilder::new()
///     .with_scope_fallback("Staging")
///     .with_timestamp_format("%Y/%m/%d %H:%M")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ReportCompilerBuilder {
    config: ReportConfig,
}

impl ReportCompilerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - タイトル: `TESTGEN PRO | TEST STRATEGY DOCUMENT`
    /// - エージェント名: `TestGen Pro Premium`
    /// - スコープのフォールバック: `Internal Environment`
    /// - シート名: `Test Strategy`
    /// - 日時フォーマット: `%Y-%m-%d %H:%M:%S`
    pub fn new() -> Self {
        Self::default()
    }

    /// タイトル帯のテキストを指定する
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// メタデータ帯に表示するエージェント名を指定する
    pub fn with_agent_label(mut self, label: impl Into<String>) -> Self {
        self.config.agent_label = label.into();
        self
    }

    /// スコープが未設定の場合に表示する文字列を指定する
    pub fn with_scope_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.config.scope_fallback = fallback.into();
        self
    }

    /// シート名を指定する
    ///
    /// # 制約
    ///
    /// * 1〜31文字
    /// * `[ ] : * ? / \` を含まない
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// 生成日時のフォーマット（chrono互換フォーマット文字列）を指定する
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.config.timestamp_format = format.into();
        self
    }

    /// 設定を検証し、`ReportCompiler`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `CaseSheetError::Config(String)`: 設定の検証に失敗した場合
    ///   * タイトルが空
    ///   * シート名が空、31文字超、または使用できない文字を含む
    ///   * 日時フォーマットが不正、または空文字列に展開される
    pub fn build(self) -> Result<ReportCompiler, CaseSheetError> {
        // 1. タイトルの検証
        if self.config.title.trim().is_empty() {
            return Err(CaseSheetError::Config(
                "Report title must not be empty".to_string(),
            ));
        }

        // 2. シート名の検証
        let sheet_name = &self.config.sheet_name;
        if sheet_name.is_empty() {
            return Err(CaseSheetError::Config(
                "Sheet name must not be empty".to_string(),
            ));
        }
        if sheet_name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(CaseSheetError::Config(format!(
                "Sheet name exceeds {} characters: '{}'",
                MAX_SHEET_NAME_LEN, sheet_name
            )));
        }
        if let Some(ch) = sheet_name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
            return Err(CaseSheetError::Config(format!(
                "Sheet name contains invalid character '{}': '{}'",
                ch, sheet_name
            )));
        }

        // 3. 日時フォーマットの検証（テスト用の日時でフォーマット試行）
        let sample = DateTime::parse_from_rfc3339("2025-01-01T00:00:00+00:00")
            .map_err(|e| CaseSheetError::Config(format!("Failed to create test date: {}", e)))?;
        let mut rendered = String::new();
        if write!(rendered, "{}", sample.format(&self.config.timestamp_format)).is_err()
            || rendered.is_empty()
        {
            return Err(CaseSheetError::Config(format!(
                "Invalid timestamp format string: '{}'",
                self.config.timestamp_format
            )));
        }

        Ok(ReportCompiler {
            config: self.config,
        })
    }
}

/// レポート生成のファサード
///
/// レコードの検証は行いません。生成が失敗するのはワークブック書き込み時の
/// リソース枯渇のみで、その場合のエラーは再試行せずに呼び出し側へ伝播します。
///
/// # 使用例
///
/// ```rust
/// use casesheet::{ReportCompilerBuilder, ReportMeta, TestCaseRecord};
///
/// # fn main() -> Result<(), casesheet::CaseSheetError> {
/// let compiler = ReportCompilerBuilder::new().build()?;
/// let records = vec![TestCaseRecord::new("TC001", "Login", "1. Open app", "Success")];
/// let bytes = compiler.compile(&records, &ReportMeta::now().with_scope("https://example.com"))?;
/// assert!(bytes.starts_with(b"PK"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReportCompiler {
    config: ReportConfig,
}

impl ReportCompiler {
    /// レコード列をXLSXドキュメントのバイト列に変換
    pub fn compile(
        &self,
        records: &[TestCaseRecord],
        meta: &ReportMeta,
    ) -> Result<Vec<u8>, CaseSheetError> {
        let mut workbook = Workbook::new();
        self.write_sheet(workbook.add_worksheet(), records, meta)?;
        let buffer = workbook.save_to_buffer()?;

        info!(
            records = records.len(),
            bytes = buffer.len(),
            sheet = %self.config.sheet_name,
            "compiled test strategy report"
        );

        Ok(buffer)
    }

    /// レコード列をXLSXドキュメントとしてライターに出力
    pub fn compile_to_writer<W: Write>(
        &self,
        records: &[TestCaseRecord],
        meta: &ReportMeta,
        mut output: W,
    ) -> Result<(), CaseSheetError> {
        let buffer = self.compile(records, meta)?;
        output.write_all(&buffer)?;
        output.flush()?;
        Ok(())
    }

    /// 命名規則に従ったファイル名で`dir`にレポートを保存し、そのパスを返す
    pub fn save<P: AsRef<Path>>(
        &self,
        records: &[TestCaseRecord],
        meta: &ReportMeta,
        dir: P,
    ) -> Result<PathBuf, CaseSheetError> {
        let path = dir.as_ref().join(report_file_name(&meta.generated_at));
        let buffer = self.compile(records, meta)?;
        std::fs::write(&path, buffer)?;
        Ok(path)
    }

    /// メタデータ帯のテキスト
    pub fn meta_line(&self, meta: &ReportMeta) -> String {
        let scope = meta
            .scope_label
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.scope_fallback);

        // フォーマット文字列はbuild()で検証済み
        let line = format!(
            "Generated: {} | Agent: {} | Scope: {}",
            meta.generated_at.format(&self.config.timestamp_format),
            self.config.agent_label,
            scope
        );
        let fitted = fit_cell_text(&line);
        if fitted.len() < line.len() {
            warn!(
                chars = line.chars().count(),
                "meta line truncated to cell limit"
            );
            return fitted.to_string();
        }
        line
    }

    pub fn sheet_name(&self) -> &str {
        &self.config.sheet_name
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    fn write_sheet(
        &self,
        worksheet: &mut Worksheet,
        records: &[TestCaseRecord],
        meta: &ReportMeta,
    ) -> Result<(), CaseSheetError> {
        worksheet.set_name(&self.config.sheet_name)?;

        for (col, spec) in COLUMNS.iter().enumerate() {
            worksheet.set_column_width(col as u16, spec.width)?;
        }

        // 1. タイトル帯・メタデータ帯
        worksheet.merge_range(
            layout::TITLE_ROW,
            0,
            layout::TITLE_ROW,
            layout::LAST_COL,
            fit_cell_text(&self.config.title),
            &layout::title_format(),
        )?;
        worksheet.set_row_height(layout::TITLE_ROW, layout::TITLE_ROW_HEIGHT)?;

        worksheet.merge_range(
            layout::META_ROW,
            0,
            layout::META_ROW,
            layout::LAST_COL,
            &self.meta_line(meta),
            &layout::meta_format(),
        )?;
        worksheet.set_row_height(layout::META_ROW, layout::META_ROW_HEIGHT)?;

        // 2. 列ヘッダー
        let header_format = layout::header_format();
        for (col, spec) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(
                layout::HEADER_ROW,
                col as u16,
                spec.header,
                &header_format,
            )?;
        }
        worksheet.set_row_height(layout::HEADER_ROW, layout::HEADER_ROW_HEIGHT)?;

        // 3. データ行
        let plain = (layout::data_format(false), layout::status_format(false));
        let striped = (layout::data_format(true), layout::status_format(true));

        for (index, record) in records.iter().enumerate() {
            let row = layout::data_row(index);
            let (cell_format, status_format) = if layout::is_striped(index) {
                (&striped.0, &striped.1)
            } else {
                (&plain.0, &plain.1)
            };

            let values = [
                record.id(),
                record.description(),
                record.steps(),
                record.expected_result(),
            ];
            for (col, value) in values.iter().enumerate() {
                let text = fit_cell_text(value);
                if text.len() < value.len() {
                    warn!(
                        id = record.id(),
                        column = COLUMNS[col].header,
                        chars = value.chars().count(),
                        "cell text truncated to cell limit"
                    );
                }
                worksheet.write_string_with_format(row, col as u16, text, cell_format)?;
            }
            // Actual Result は空のまま
            worksheet.write_blank(row, 4, cell_format)?;
            worksheet.write_string_with_format(
                row,
                layout::STATUS_COL,
                Status::Pending.as_str(),
                status_format,
            )?;
        }

        // 4. Status列の入力規則
        if !records.is_empty() {
            let choices = Status::ALL.map(|s| s.as_str());
            let validation = DataValidation::new()
                .allow_list_strings(&choices)?
                .ignore_blank(true);
            worksheet.add_data_validation(
                layout::FIRST_DATA_ROW,
                layout::STATUS_COL,
                layout::data_row(records.len() - 1),
                layout::STATUS_COL,
                &validation,
            )?;
        }

        // 5. オートフィルターとウィンドウ枠の固定
        worksheet.autofilter(layout::HEADER_ROW, 0, layout::HEADER_ROW, layout::LAST_COL)?;
        worksheet.set_freeze_panes(layout::FIRST_DATA_ROW, 0)?;

        Ok(())
    }
}
