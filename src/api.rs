//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use std::fmt;

/// アシスタントの動作モード
///
/// プロンプトの指示内容を切り替えます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum AppMode {
    /// テストケース生成モード（デフォルト）
    ///
    /// 機能説明に対してテストケースのJSON配列を出力するよう指示します。
    /// 挨拶や一般的な質問には自然な文章で応答させます。
    #[default]
    TestGen,

    /// 一般モード
    ///
    /// 一般的な質問に応答させ、構造化JSONの出力を禁止します。
    General,
}

/// テスト実行ステータス
///
/// レポートのStatus列で選択できる値です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pass,
    Fail,
    Blocked,
    Pending,
}

impl Status {
    /// ドロップダウンに表示される順序
    pub const ALL: [Status; 4] = [Status::Pass, Status::Fail, Status::Blocked, Status::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Blocked => "BLOCKED",
            Status::Pending => "PENDING",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
