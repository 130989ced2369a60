//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! LLM応答の解析失敗はエラーではなく、`Interpretation::Unparsed`として表現される。
//! このモジュールのエラーは、レポート生成・読み戻し・設定検証など、
//! 呼び出し側に伝播すべき失敗のみを扱う。

use thiserror::Error;

/// casesheetクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（レポートファイルの書き込み失敗など）
/// - `Xlsx`: XLSXドキュメントの生成中に発生したエラー（rust_xlsxwriter由来）
/// - `Parse`: XLSXドキュメントの読み戻し中に発生したエラー（calamine由来）
/// - `Config`: 設定の検証に失敗したエラー（不正なシート名など）
/// - `MissingCredential`: APIキーが未設定のまま送信しようとした
///
/// # 使用例
///
/// ```rust,no_run
/// use casesheet::CaseSheetError;
/// use std::fs::File;
///
/// fn open_report(path: &str) -> Result<(), CaseSheetError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CaseSheetError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XLSXドキュメントの生成エラー
    ///
    /// レポート生成はリソース枯渇以外では失敗しないため、
    /// このエラーは致命的なものとして呼び出し側に伝播され、再試行されません。
    #[error("Failed to write report workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// XLSXドキュメントの解析中に発生したエラー
    ///
    /// `ReportInspector`がcalamineでワークブックを開く際に発生します。
    #[error("Failed to parse report workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// 整数の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// 浮動小数点数の解析エラー（行の高さ・列幅）
    #[error("Number parse error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// JSONのシリアライズ・デシリアライズエラー
    ///
    /// チャット補完APIのリクエスト生成・レスポンス解析で発生します。
    /// モデル出力内のテストケース配列の解析失敗はこのエラーにはなりません。
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ReportCompilerBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use casesheet::{CaseSheetError, ReportCompilerBuilder};
    ///
    /// let result = ReportCompilerBuilder::new()
    ///     .with_sheet_name("Q1/Q2")  // '/'はシート名に使用できない
    ///     .build();
    ///
    /// match result {
    ///     Err(CaseSheetError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// APIキーが設定されていない
    ///
    /// 会話コントローラーはこのエラーを受け取った時点で処理を中断し、
    /// 解析・レポート生成は一切実行しません。
    #[error("Missing API credential: add an API key in Settings")]
    MissingCredential,

    /// チャット補完レスポンスにメッセージ本文が含まれていない
    #[error("Chat completion response contained no message content")]
    EmptyResponse,

    /// セキュリティ制限に違反したエラー
    ///
    /// レポートの読み戻し時に、ZIP bomb攻撃やパストラバーサル攻撃などの
    /// 制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
