//! Report Inspector Module
//!
//! 生成済みXLSXドキュメントを読み戻し、セルの値・書式・レイアウトを
//! 検査可能なスナップショットとして提供するモジュール。
//!
//! セルの値はcalamineで、calamineが扱わない書式やレイアウト情報は
//! ZIPアーカイブ内のXMLを直接解析して取得します。

mod sheet;
mod styles;

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use quick_xml::events::BytesStart;
use tracing::debug;
use zip::ZipArchive;

use crate::error::CaseSheetError;
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellRange};

use sheet::SheetLayout;
use styles::StyleSheet;

/// フォント情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    /// RGB形式（"FFFFFF"）。テーマ色の場合はNone
    pub color: Option<String>,
}

/// セルに適用された書式
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub font: FontStyle,
    /// 単色塗りつぶしの色（RGB形式）
    pub fill: Option<String>,
    /// 上下左右すべてが細線の罫線か
    pub thin_border: bool,
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub wrap: bool,
}

/// 入力規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    /// 規則の種類（"list"など）
    pub kind: String,
    pub allow_blank: bool,
    /// 適用範囲
    pub ranges: Vec<CellRange>,
    /// リスト形式の選択肢
    pub choices: Vec<String>,
}

impl ValidationRule {
    /// 指定された座標に規則が適用されるか
    pub fn applies_to(&self, coord: CellCoord) -> bool {
        self.ranges.iter().any(|range| range.contains(coord))
    }
}

/// 読み戻したワークシートのスナップショット
///
/// 最初のワークシートのみを対象とします。
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    sheet_names: Vec<String>,
    cells: Vec<Vec<String>>,
    layout: SheetLayoutView,
    styles: BTreeMap<CellCoord, CellStyle>,
}

/// `SheetLayout`のうち公開する部分
#[derive(Debug, Clone, PartialEq)]
struct SheetLayoutView {
    merged_ranges: Vec<CellRange>,
    autofilter: Option<CellRange>,
    frozen_rows: Option<u32>,
    validations: Vec<ValidationRule>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u32, f64>,
}

impl ReportSnapshot {
    /// ワークブック内のシート名（ブック内の順序）
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// 検査対象のシート名
    pub fn sheet_name(&self) -> &str {
        self.sheet_names.first().map(String::as_str).unwrap_or("")
    }

    /// セルの文字列値（範囲外や空セルは空文字列）
    pub fn cell_text(&self, row: u32, col: u32) -> &str {
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 行全体の値
    pub fn row_values(&self, row: u32) -> &[String] {
        self.cells.get(row as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 値を持つ最終行までの行数
    pub fn row_count(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.layout.merged_ranges
    }

    pub fn autofilter(&self) -> Option<CellRange> {
        self.layout.autofilter
    }

    /// ウィンドウ枠で固定された行数
    pub fn frozen_rows(&self) -> Option<u32> {
        self.layout.frozen_rows
    }

    pub fn validations(&self) -> &[ValidationRule] {
        &self.layout.validations
    }

    /// 指定された座標に適用される入力規則
    pub fn validation_at(&self, row: u32, col: u32) -> Option<&ValidationRule> {
        let coord = CellCoord::new(row, col);
        self.layout
            .validations
            .iter()
            .find(|rule| rule.applies_to(coord))
    }

    /// 明示的に設定された行の高さ（ポイント）
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.layout.row_heights.get(&row).copied()
    }

    /// 明示的に設定された列幅（XLSX上の値。書き込み時の幅より余白分だけ大きい）
    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.layout.column_widths.get(&col).copied()
    }

    /// セルの書式（スタイルIDを持たないセルはNone）
    pub fn style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.styles.get(&CellCoord::new(row, col))
    }
}

/// XLSXドキュメントの読み戻し
pub struct ReportInspector;

impl ReportInspector {
    /// リーダーから読み込んで検査する
    pub fn inspect_reader<R: Read>(mut reader: R) -> Result<ReportSnapshot, CaseSheetError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Self::inspect(&buffer)
    }

    /// バイト列を検査する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ReportSnapshot)` - 最初のワークシートのスナップショット
    /// * `Err(CaseSheetError::SecurityViolation)` - サイズ・ファイル数・パスの制限に違反した場合
    /// * `Err(CaseSheetError::Zip)` - ZIPアーカイブとして不正な場合
    /// * `Err(CaseSheetError::Parse)` - calamineが読み込めない場合
    pub fn inspect(bytes: &[u8]) -> Result<ReportSnapshot, CaseSheetError> {
        let security = SecurityConfig::default();
        security.check_input_size(bytes.len())?;

        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| CaseSheetError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;

        let sheet_path = first_worksheet_path(&archive).ok_or_else(|| {
            CaseSheetError::Zip("Workbook does not contain any worksheet".to_string())
        })?;
        let layout = SheetLayout::parse(&read_entry(&mut archive, &sheet_path)?)?;
        let stylesheet = if archive.file_names().any(|name| name == "xl/styles.xml") {
            StyleSheet::parse(&read_entry(&mut archive, "xl/styles.xml")?)?
        } else {
            StyleSheet::default()
        };

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| CaseSheetError::Parse(calamine::Error::Xlsx(e)))?;
        let sheet_names = workbook.sheet_names().to_vec();
        let cells: Vec<Vec<String>> = match sheet_names.first() {
            Some(name) => {
                let range = workbook
                    .worksheet_range(name)
                    .map_err(|e| CaseSheetError::Parse(calamine::Error::Xlsx(e)))?;
                match range.end() {
                    Some((last_row, last_col)) => (0..=last_row)
                        .map(|row| {
                            (0..=last_col)
                                .map(|col| {
                                    range
                                        .get_value((row, col))
                                        .map(|value| value.to_string())
                                        .unwrap_or_default()
                                })
                                .collect()
                        })
                        .collect(),
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        };

        let styles = layout
            .style_ids
            .iter()
            .map(|(&coord, &xf)| (coord, stylesheet.resolve(xf)))
            .collect();

        debug!(
            sheet = %sheet_path,
            rows = cells.len(),
            styled_cells = layout.style_ids.len(),
            "inspected workbook"
        );

        Ok(ReportSnapshot {
            sheet_names,
            cells,
            layout: SheetLayoutView {
                merged_ranges: layout.merged_ranges,
                autofilter: layout.autofilter,
                frozen_rows: layout.frozen_rows,
                validations: layout.validations,
                row_heights: layout.row_heights,
                column_widths: layout.column_widths,
            },
            styles,
        })
    }
}

/// 最初のワークシートのパス（xl/worksheets/sheetN.xmlのうちNが最小のもの）
fn first_worksheet_path<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<String> {
    archive
        .file_names()
        .filter_map(|name| {
            let index = name
                .strip_prefix("xl/worksheets/sheet")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((index, name.to_string()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, name)| name)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, CaseSheetError> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| CaseSheetError::Zip(format!("{}: {}", name, e)))?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

/// 属性値を取得（存在しない場合はNone）
pub(crate) fn attr_value(
    element: &BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, CaseSheetError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| CaseSheetError::Xml(format!("XML attribute error: {}", e)))?;
        if attr.key.as_ref() == key {
            return Ok(Some(std::str::from_utf8(&attr.value)?.to_string()));
        }
    }
    Ok(None)
}
