//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! テストケースレコード（正規化済み）と、モデル出力から読み取る生のJSON表現、
//! およびレポートの読み戻しで使用するセル座標型を含みます。

use std::fmt;

use serde::Deserialize;

/// 1つのテストシナリオを表す正規化済みレコード
///
/// 通常は`interpret`がモデル出力から生成します。生成後は不変で、
/// `TestCaseStore`に追加された後も変更・削除されることはありません。
///
/// `id`は表示用の識別子であり、セッション内での一意性は保証されません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseRecord {
    id: String,
    description: String,
    steps: String,
    expected_result: String,
}

impl TestCaseRecord {
    /// 新しいレコードを生成
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        steps: impl Into<String>,
        expected_result: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            steps: steps.into(),
            expected_result: expected_result.into(),
        }
    }

    /// ケースID（例: "TC001"）
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 要件・シナリオの説明（省略時は空文字列）
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 実行手順（単一のテキストブロック）
    pub fn steps(&self) -> &str {
        &self.steps
    }

    /// 期待結果（`expected_result`と`expected`を解決済み、省略時は空文字列）
    pub fn expected_result(&self) -> &str {
        &self.expected_result
    }
}

/// モデル出力に含まれるテストケースオブジェクトの生の表現
///
/// 期待結果のフィールド名は過去に`expected_result`と`expected`の2種類が
/// 使われていたため、両方を受け取り、`TestCaseRecord`への変換時に1度だけ解決します。
#[derive(Debug, Deserialize)]
pub(crate) struct RawTestCase {
    id: ScalarText,
    #[serde(default)]
    description: Option<TextBlock>,
    steps: TextBlock,
    #[serde(default)]
    expected_result: Option<TextBlock>,
    #[serde(default)]
    expected: Option<TextBlock>,
}

/// 文字列または数値として出力されたID
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Number(serde_json::Number),
}

/// 単一テキストまたは行の配列として出力された自由記述
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextBlock {
    Text(String),
    Lines(Vec<String>),
}

impl TextBlock {
    /// 行の配列は改行で連結する
    fn into_text(self) -> String {
        match self {
            TextBlock::Text(s) => s,
            TextBlock::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<RawTestCase> for TestCaseRecord {
    fn from(raw: RawTestCase) -> Self {
        let id = match raw.id {
            ScalarText::Text(s) => s,
            ScalarText::Number(n) => n.to_string(),
        };

        // `expected_result`が空の場合は`expected`にフォールバックする
        let expected_result = raw
            .expected_result
            .map(TextBlock::into_text)
            .filter(|s| !s.is_empty())
            .or_else(|| raw.expected.map(TextBlock::into_text))
            .unwrap_or_default();

        Self {
            id,
            description: raw.description.map(TextBlock::into_text).unwrap_or_default(),
            steps: raw.steps.into_text(),
            expected_result,
        }
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// A1形式の文字列を座標に変換（例: "F5" -> (4, 5)）
    ///
    /// `$`による絶対参照は無視します。
    pub fn parse_a1(ref_str: &str) -> Option<Self> {
        let ref_str = ref_str.trim().replace('$', "");
        let split = ref_str.find(|c: char| c.is_ascii_digit())?;
        let (col_str, row_str) = ref_str.split_at(split);

        if col_str.is_empty() || !col_str.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }

        // 列を数値に変換（A=0, B=1, ..., Z=25, AA=26, ...）
        let col = col_str
            .chars()
            .try_fold(0u32, |acc, ch| {
                acc.checked_mul(26)?.checked_add(ch as u32 - 'A' as u32 + 1)
            })?
            - 1;

        // 行は1始まりなので0始まりに変換
        let row = row_str.parse::<u32>().ok()?.checked_sub(1)?;

        Some(Self::new(row, col))
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_notation())
    }
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    ///
    /// 逆順に指定された端点は左上・右下に正規化します。
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// "A1:F1"形式、または単一セル"F5"形式の文字列を範囲に変換
    pub fn parse_a1(range_str: &str) -> Option<Self> {
        match range_str.split_once(':') {
            Some((start, end)) => Some(Self::new(
                CellCoord::parse_a1(start)?,
                CellCoord::parse_a1(end)?,
            )),
            None => {
                let coord = CellCoord::parse_a1(range_str)?;
                Some(Self::new(coord, coord))
            }
        }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// 範囲のサイズ（行数 × 列数）を計算
    pub fn size(&self) -> (u32, u32) {
        let rows = self.end.row.abs_diff(self.start.row) + 1;
        let cols = self.end.col.abs_diff(self.start.col) + 1;
        (rows, cols)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
