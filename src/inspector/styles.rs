//! xl/styles.xml の解析
//!
//! `<fonts>`・`<fills>`・`<borders>`・`<cellXfs>`を読み取り、
//! セルのスタイルID（`s`属性）から実際の書式を解決します。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{attr_value, CellStyle, FontStyle};
use crate::error::CaseSheetError;

/// cellXfs要素
#[derive(Debug, Clone, Default)]
struct XfRecord {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    horizontal: Option<String>,
    vertical: Option<String>,
    wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

/// 解析済みのスタイル表
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    fonts: Vec<FontStyle>,
    /// 単色塗りつぶしの色（`patternType="solid"`以外はNone）
    fills: Vec<Option<String>>,
    /// 上下左右すべてが細線かどうか
    borders: Vec<bool>,
    cell_xfs: Vec<XfRecord>,
}

impl StyleSheet {
    pub fn parse(xml: &[u8]) -> Result<Self, CaseSheetError> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut section = Section::Other;
        let mut buf = Vec::new();

        let mut font = FontStyle::default();
        let mut fill_pattern: Option<String> = None;
        let mut fill_color: Option<String> = None;
        let mut thin_sides = 0;
        let mut xf: Option<XfRecord> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| CaseSheetError::Xml(e.to_string()))?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    match (section, e.name().as_ref()) {
                        (_, b"fonts") => section = Section::Fonts,
                        (_, b"fills") => section = Section::Fills,
                        (_, b"borders") => section = Section::Borders,
                        (_, b"cellXfs") => section = Section::CellXfs,

                        (Section::Fonts, b"font") => {
                            font = FontStyle::default();
                            if is_empty {
                                sheet.fonts.push(font.clone());
                            }
                        }
                        (Section::Fonts, b"b") => font.bold = true,
                        (Section::Fonts, b"i") => font.italic = true,
                        (Section::Fonts, b"sz") => {
                            if let Some(val) = attr_value(e, b"val")? {
                                font.size = Some(val.parse()?);
                            }
                        }
                        (Section::Fonts, b"color") => {
                            font.color = attr_value(e, b"rgb")?.map(|rgb| normalize_rgb(&rgb));
                        }
                        (Section::Fonts, b"name") => font.name = attr_value(e, b"val")?,

                        (Section::Fills, b"fill") => {
                            fill_pattern = None;
                            fill_color = None;
                        }
                        (Section::Fills, b"patternFill") => {
                            fill_pattern = attr_value(e, b"patternType")?;
                        }
                        (Section::Fills, b"fgColor") => {
                            fill_color = attr_value(e, b"rgb")?.map(|rgb| normalize_rgb(&rgb));
                        }

                        (Section::Borders, b"border") => {
                            thin_sides = 0;
                            if is_empty {
                                sheet.borders.push(false);
                            }
                        }
                        (Section::Borders, b"left" | b"right" | b"top" | b"bottom") => {
                            if attr_value(e, b"style")?.as_deref() == Some("thin") {
                                thin_sides += 1;
                            }
                        }

                        (Section::CellXfs, b"xf") => {
                            let record = parse_xf(e)?;
                            if is_empty {
                                sheet.cell_xfs.push(record);
                            } else {
                                xf = Some(record);
                            }
                        }
                        (Section::CellXfs, b"alignment") => {
                            if let Some(record) = xf.as_mut() {
                                record.horizontal = attr_value(e, b"horizontal")?;
                                record.vertical = attr_value(e, b"vertical")?;
                                record.wrap = matches!(
                                    attr_value(e, b"wrapText")?.as_deref(),
                                    Some("1") | Some("true")
                                );
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => match (section, e.name().as_ref()) {
                    (_, b"fonts" | b"fills" | b"borders" | b"cellXfs") => {
                        section = Section::Other;
                    }
                    (Section::Fonts, b"font") => sheet.fonts.push(font.clone()),
                    (Section::Fills, b"fill") => {
                        let solid = fill_pattern.as_deref() == Some("solid");
                        sheet.fills.push(if solid { fill_color.take() } else { None });
                    }
                    (Section::Borders, b"border") => sheet.borders.push(thin_sides == 4),
                    (Section::CellXfs, b"xf") => {
                        if let Some(record) = xf.take() {
                            sheet.cell_xfs.push(record);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// スタイルIDから書式を解決する
    ///
    /// 範囲外のIDは既定の書式として扱います。
    pub fn resolve(&self, xf_index: usize) -> CellStyle {
        let Some(xf) = self.cell_xfs.get(xf_index) else {
            return CellStyle::default();
        };

        CellStyle {
            font: self.fonts.get(xf.font_id).cloned().unwrap_or_default(),
            fill: self.fills.get(xf.fill_id).cloned().flatten(),
            thin_border: self.borders.get(xf.border_id).copied().unwrap_or(false),
            horizontal: xf.horizontal.clone(),
            vertical: xf.vertical.clone(),
            wrap: xf.wrap,
        }
    }
}

fn parse_xf(e: &BytesStart<'_>) -> Result<XfRecord, CaseSheetError> {
    let id = |key: &[u8]| -> Result<usize, CaseSheetError> {
        Ok(match attr_value(e, key)? {
            Some(v) => v.parse()?,
            None => 0,
        })
    };

    Ok(XfRecord {
        font_id: id(b"fontId")?,
        fill_id: id(b"fillId")?,
        border_id: id(b"borderId")?,
        ..XfRecord::default()
    })
}

/// ARGB（"FF1A73E8"）をRGB（"1A73E8"）に正規化
fn normalize_rgb(rgb: &str) -> String {
    let rgb = rgb.to_ascii_uppercase();
    if rgb.len() == 8 && rgb.is_ascii() {
        rgb[2..].to_string()
    } else {
        rgb
    }
}
