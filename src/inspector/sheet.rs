//! ワークシートXMLの解析
//!
//! calamineが扱わないレイアウト情報（結合セル・ウィンドウ枠の固定・
//! オートフィルター・入力規則・行の高さ・列幅・セルのスタイルID）を抽出します。

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{attr_value, ValidationRule};
use crate::error::CaseSheetError;
use crate::types::{CellCoord, CellRange};

/// ワークシートの最大列数（XFD列）
const MAX_COLUMNS: u32 = 16_384;

/// ワークシートのレイアウト情報
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetLayout {
    pub merged_ranges: Vec<CellRange>,
    pub autofilter: Option<CellRange>,
    pub frozen_rows: Option<u32>,
    pub validations: Vec<ValidationRule>,
    pub row_heights: BTreeMap<u32, f64>,
    pub column_widths: BTreeMap<u32, f64>,
    pub style_ids: BTreeMap<CellCoord, usize>,
}

impl SheetLayout {
    pub fn parse(xml: &[u8]) -> Result<Self, CaseSheetError> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut layout = SheetLayout::default();
        let mut buf = Vec::new();
        let mut validation: Option<ValidationRule> = None;
        let mut in_formula1 = false;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| CaseSheetError::Xml(e.to_string()))?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    match e.name().as_ref() {
                        b"pane" => {
                            let frozen = matches!(
                                attr_value(e, b"state")?.as_deref(),
                                Some("frozen") | Some("frozenSplit")
                            );
                            if frozen {
                                if let Some(split) = attr_value(e, b"ySplit")? {
                                    layout.frozen_rows = Some(split.parse::<f64>()? as u32);
                                }
                            }
                        }
                        b"col" => {
                            let min: u32 = attr_value(e, b"min")?.unwrap_or_default().parse()?;
                            let max: u32 = attr_value(e, b"max")?.unwrap_or_default().parse()?;
                            if let Some(width) = attr_value(e, b"width")? {
                                let width: f64 = width.parse()?;
                                // 列番号は1始まり
                                for col in min.max(1)..=max.min(MAX_COLUMNS) {
                                    layout.column_widths.insert(col - 1, width);
                                }
                            }
                        }
                        b"row" => {
                            if let (Some(r), Some(ht)) =
                                (attr_value(e, b"r")?, attr_value(e, b"ht")?)
                            {
                                let r: u32 = r.parse()?;
                                if r > 0 {
                                    layout.row_heights.insert(r - 1, ht.parse()?);
                                }
                            }
                        }
                        b"c" => {
                            let coord = attr_value(e, b"r")?
                                .as_deref()
                                .and_then(CellCoord::parse_a1);
                            if let (Some(coord), Some(s)) = (coord, attr_value(e, b"s")?) {
                                layout.style_ids.insert(coord, s.parse()?);
                            }
                        }
                        b"mergeCell" => {
                            if let Some(range) =
                                attr_value(e, b"ref")?.as_deref().and_then(CellRange::parse_a1)
                            {
                                layout.merged_ranges.push(range);
                            }
                        }
                        b"autoFilter" => {
                            layout.autofilter =
                                attr_value(e, b"ref")?.as_deref().and_then(CellRange::parse_a1);
                        }
                        b"dataValidation" => {
                            let rule = ValidationRule {
                                kind: attr_value(e, b"type")?.unwrap_or_default(),
                                allow_blank: matches!(
                                    attr_value(e, b"allowBlank")?.as_deref(),
                                    Some("1") | Some("true")
                                ),
                                ranges: attr_value(e, b"sqref")?
                                    .unwrap_or_default()
                                    .split_whitespace()
                                    .filter_map(CellRange::parse_a1)
                                    .collect(),
                                choices: Vec::new(),
                            };
                            if is_empty {
                                layout.validations.push(rule);
                            } else {
                                validation = Some(rule);
                            }
                        }
                        b"formula1" => in_formula1 = !is_empty,
                        _ => {}
                    }
                }
                Event::Text(ref e) if in_formula1 => {
                    if let Some(rule) = validation.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| CaseSheetError::Xml(err.to_string()))?;
                        rule.choices = parse_list_formula(&text);
                    }
                }
                Event::End(ref e) => match e.name().as_ref() {
                    b"formula1" => in_formula1 = false,
                    b"dataValidation" => {
                        if let Some(rule) = validation.take() {
                            layout.validations.push(rule);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(layout)
    }
}

/// リスト形式の入力規則（`"PASS,FAIL"`）を選択肢に分解
fn parse_list_formula(formula: &str) -> Vec<String> {
    let trimmed = formula.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|s| s.trim().to_string()).collect()
}
