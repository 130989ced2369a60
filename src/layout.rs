//! Report Layout Module
//!
//! テスト戦略シートの固定レイアウト（行位置・列定義・配色）と、
//! 各領域のセル書式を定義するモジュール。
//!
//! 行・列番号はすべて0始まりです（Excel上の4行目 = `HEADER_ROW` = 3）。

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};

/// タイトル帯の行
pub const TITLE_ROW: u32 = 0;

/// メタデータ帯の行
pub const META_ROW: u32 = 1;

/// 列ヘッダーの行（3行目は空行）
pub const HEADER_ROW: u32 = 3;

/// 最初のデータ行
pub const FIRST_DATA_ROW: u32 = 4;

/// 最後の列（F列）
pub const LAST_COL: u16 = 5;

/// Status列（F列）
pub const STATUS_COL: u16 = 5;

pub const TITLE_ROW_HEIGHT: f64 = 40.0;
pub const META_ROW_HEIGHT: f64 = 25.0;
pub const HEADER_ROW_HEIGHT: f64 = 30.0;

/// タイトル帯の塗りつぶし（ブランドブルー）
pub const BRAND_BLUE: u32 = 0x1A73E8;

/// ヘッダー行の塗りつぶし（ブランドグリーン）
pub const BRAND_GREEN: u32 = 0x34A853;

/// 奇数インデックスのデータ行の塗りつぶし
pub const STRIPE_GREY: u32 = 0xF8F9FA;

/// メタデータ帯の文字色
pub const META_GREY: u32 = 0x666666;

pub const WHITE: u32 = 0xFFFFFF;

pub const TITLE_FONT: &str = "Arial Black";

/// 列の定義
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    /// ヘッダー文字列
    pub header: &'static str,
    /// 列幅（文字数単位、自動調整しない）
    pub width: f64,
}

/// 6列の固定スキーマ
pub const COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec {
        header: "Case ID",
        width: 15.0,
    },
    ColumnSpec {
        header: "Requirement / Scenario",
        width: 45.0,
    },
    ColumnSpec {
        header: "Execution Steps",
        width: 70.0,
    },
    ColumnSpec {
        header: "Expected Result",
        width: 50.0,
    },
    ColumnSpec {
        header: "Actual Result",
        width: 30.0,
    },
    ColumnSpec {
        header: "Status",
        width: 15.0,
    },
];

/// データ行のシート上の行番号
pub fn data_row(index: usize) -> u32 {
    FIRST_DATA_ROW + index as u32
}

/// ゼブラストライプ判定
///
/// データブロック内の0始まりインデックスで判定します（シート上の行番号ではない）。
/// 偶数は塗りつぶしなし、奇数はライトグレー。
pub fn is_striped(index: usize) -> bool {
    index % 2 == 1
}

pub(crate) fn title_format() -> Format {
    Format::new()
        .set_font_name(TITLE_FONT)
        .set_font_size(16)
        .set_font_color(Color::RGB(WHITE))
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(BRAND_BLUE))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub(crate) fn meta_format() -> Format {
    Format::new()
        .set_font_size(10)
        .set_italic()
        .set_font_color(Color::RGB(META_GREY))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub(crate) fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(11)
        .set_font_color(Color::RGB(WHITE))
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(BRAND_GREEN))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

/// データセルの書式（Status列以外）
pub(crate) fn data_format(striped: bool) -> Format {
    let format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
        .set_align(FormatAlign::Top);
    with_stripe(format, striped)
}

/// Status列の書式
///
/// 太字・中央揃え。ストライプの塗りつぶしは他の列と同じく適用する。
pub(crate) fn status_format(striped: bool) -> Format {
    let format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    with_stripe(format, striped)
}

fn with_stripe(format: Format, striped: bool) -> Format {
    if striped {
        format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(STRIPE_GREY))
    } else {
        format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stripe_is_anchored_to_data_index() {
        assert!(!is_striped(0));
        assert!(is_striped(1));
        assert!(!is_striped(2));
        assert!(is_striped(3));
    }

    #[test]
    fn test_data_row_offsets() {
        assert_eq!(data_row(0), 4);
        assert_eq!(data_row(9), 13);
        assert_eq!(data_row(0), HEADER_ROW + 1);
    }

    #[test]
    fn test_column_schema() {
        let headers: Vec<&str> = COLUMNS.iter().map(|c| c.header).collect();
        assert_eq!(
            headers,
            vec![
                "Case ID",
                "Requirement / Scenario",
                "Execution Steps",
                "Expected Result",
                "Actual Result",
                "Status"
            ]
        );
        assert_eq!(COLUMNS.len(), LAST_COL as usize + 1);
        assert_eq!(COLUMNS[STATUS_COL as usize].header, "Status");
    }
}
