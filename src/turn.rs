//! Conversation Turn Module
//!
//! 会話の1往復分のメッセージと、添付されたテストケースバッチの表示を扱うモジュール。

use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::error::CaseSheetError;
use crate::interpreter::Interpretation;
use crate::types::TestCaseRecord;

/// バッチ表の見出し
const TABLE_HEADERS: [&str; 3] = ["Scenario ID", "Validation Target", "Expected Outcome"];

/// 発言者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// 会話の1ターン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub batch: Option<Vec<TestCaseRecord>>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            batch: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            batch: None,
        }
    }

    /// 解析結果からアシスタントのターンを生成
    pub fn from_interpretation(interpretation: Interpretation) -> Self {
        let (text, batch) = interpretation.into_parts();
        Self {
            role: Role::Assistant,
            text,
            batch,
        }
    }

    /// バッチを持つかどうか
    pub fn has_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// 添付バッチを表形式で出力する
    ///
    /// 列は「Scenario ID / Validation Target / Expected Outcome」。
    /// 全角文字は表示幅2として列幅を揃えます。バッチがない場合は何も出力しません。
    pub fn render_table<W: Write>(&self, writer: &mut W) -> Result<(), CaseSheetError> {
        let Some(batch) = &self.batch else {
            return Ok(());
        };

        let rows: Vec<[String; 3]> = batch
            .iter()
            .map(|record| {
                [
                    single_line(record.id()),
                    single_line(record.description()),
                    single_line(record.expected_result()),
                ]
            })
            .collect();

        // 最小幅は3文字（区切り行の最小幅）
        let mut widths = [3usize; 3];
        for (col, header) in TABLE_HEADERS.iter().enumerate() {
            widths[col] = widths[col].max(header.width());
        }
        for row in &rows {
            for (col, cell) in row.iter().enumerate() {
                widths[col] = widths[col].max(cell.width());
            }
        }

        write_row(writer, TABLE_HEADERS.iter().copied(), &widths)?;

        let mut separator = String::from("|");
        for width in widths {
            separator.push_str(&"-".repeat(width + 2));
            separator.push('|');
        }
        writeln!(writer, "{}", separator)?;

        for row in &rows {
            write_row(writer, row.iter().map(String::as_str), &widths)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// バッチ表を文字列として取得
    pub fn table_to_string(&self) -> Result<String, CaseSheetError> {
        let mut buffer = Vec::new();
        self.render_table(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            CaseSheetError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

fn write_row<'a, W: Write>(
    writer: &mut W,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> Result<(), CaseSheetError> {
    write!(writer, "|")?;
    for (cell, &width) in cells.zip(widths) {
        let padding = width.saturating_sub(cell.width());
        write!(writer, " {}{} |", cell, " ".repeat(padding))?;
    }
    writeln!(writer)?;
    Ok(())
}

/// 改行とパイプを表の1セルに収まる形にする
fn single_line(s: &str) -> String {
    s.trim()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
