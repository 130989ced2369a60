//! Test Case Store Module
//!
//! セッション中に抽出されたすべてのテストケースを蓄積する追記専用ストア。

use crate::types::TestCaseRecord;

/// 追記専用のテストケースストア
///
/// 会話コントローラー（`Session`など）が所有し、変更は`append`のみで行います。
/// レポート生成には`records()`で読み取り専用のスライスを渡します。
/// 格納順は抽出された時系列順であり、レポートの行順と一致します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseStore {
    records: Vec<TestCaseRecord>,
}

impl TestCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// バッチを末尾に追加し、追加した件数を返す
    pub fn append<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = TestCaseRecord>,
    {
        let before = self.records.len();
        self.records.extend(batch);
        self.records.len() - before
    }

    pub fn records(&self) -> &[TestCaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCaseRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a TestCaseStore {
    type Item = &'a TestCaseRecord;
    type IntoIter = std::slice::Iter<'a, TestCaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
