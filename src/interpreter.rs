//! Response Interpreter Module
//!
//! LLMの自由形式テキストから、テストケースの構造化バッチを最大1つ抽出するモジュール。
//!
//! モデル出力は信頼できない前提で扱います。散文のみ、散文と構造の混在、
//! 壊れた構造のいずれもあり得るため、抽出はベストエフォートで行い、
//! 失敗した場合は「応答全体をチャットメッセージとして扱う」経路に縮退します。
//! 縮退は`Interpretation::Unparsed`として表現され、エラーにはなりません。

use tracing::debug;

use crate::types::{RawTestCase, TestCaseRecord};

/// 解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// 構造化バッチの抽出に成功
    Parsed {
        /// バッチ部分を取り除いた残りのテキスト（空の場合は定型メッセージ）
        display_text: String,
        /// 出現順のレコード
        records: Vec<TestCaseRecord>,
    },

    /// 構造化バッチが存在しない、または解析できなかった
    Unparsed {
        /// 元のテキスト（無加工）
        text: String,
    },
}

impl Interpretation {
    /// 表示用テキスト
    pub fn display_text(&self) -> &str {
        match self {
            Interpretation::Parsed { display_text, .. } => display_text,
            Interpretation::Unparsed { text } => text,
        }
    }

    /// 抽出されたレコード（`Unparsed`の場合は`None`）
    pub fn records(&self) -> Option<&[TestCaseRecord]> {
        match self {
            Interpretation::Parsed { records, .. } => Some(records),
            Interpretation::Unparsed { .. } => None,
        }
    }

    /// 表示用テキストとレコードに分解する
    pub fn into_parts(self) -> (String, Option<Vec<TestCaseRecord>>) {
        match self {
            Interpretation::Parsed {
                display_text,
                records,
            } => (display_text, Some(records)),
            Interpretation::Unparsed { text } => (text, None),
        }
    }
}

/// 残りのテキストが空だった場合の定型メッセージ
pub fn confirmation_message(count: usize) -> String {
    format!(
        "I've analyzed your requirements and designed {} test scenarios.",
        count
    )
}

/// モデル出力を解析する
///
/// # 処理フロー
///
/// 1. 最初の`[`から最後の`]`までを候補スパンとする（貪欲一致）
/// 2. 候補スパンをテストケースオブジェクトのJSON配列として厳密に解析する
/// 3. 成功した場合、元のテキストからスパンを取り除き、前後の空白を除去する
///
/// 応答に配列が2つ含まれる場合、間の散文ごと1つのスパンとして扱われるため、
/// 通常は解析に失敗して`Unparsed`になります。
///
/// # 使用例
///
/// ```rust
/// use casesheet::{interpret, Interpretation};
///
/// let result = interpret("Hello");
/// assert_eq!(result, Interpretation::Unparsed { text: "Hello".to_string() });
/// ```
pub fn interpret(raw_text: &str) -> Interpretation {
    let Some((start, end)) = find_structured_span(raw_text) else {
        debug!("no bracketed span in model output");
        return Interpretation::Unparsed {
            text: raw_text.to_string(),
        };
    };

    let span = &raw_text[start..end];
    let raw_cases = match serde_json::from_str::<Vec<RawTestCase>>(span) {
        Ok(raw_cases) => raw_cases,
        Err(e) => {
            debug!(error = %e, span_len = span.len(), "structured span did not parse");
            return Interpretation::Unparsed {
                text: raw_text.to_string(),
            };
        }
    };

    let records: Vec<TestCaseRecord> = raw_cases.into_iter().map(TestCaseRecord::from).collect();

    let mut residual = String::with_capacity(raw_text.len() - span.len());
    residual.push_str(&raw_text[..start]);
    residual.push_str(&raw_text[end..]);
    let residual = residual.trim();

    let display_text = if residual.is_empty() {
        confirmation_message(records.len())
    } else {
        residual.to_string()
    };

    debug!(records = records.len(), "extracted test case batch");

    Interpretation::Parsed {
        display_text,
        records,
    }
}

/// 最初の`[`から最後の`]`までのバイト範囲（終端は`]`の直後）
fn find_structured_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some((start, end + 1))
}
