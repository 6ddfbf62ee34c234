use crate::fields::HeaderSpec;
use serde::Serialize;
use umya_spreadsheet::structs::{EnumTrait, HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::{Border, PatternValues, Style, Worksheet};

pub const HEADER_FILL_ARGB: &str = "FF366092";
pub const HEADER_FONT_ARGB: &str = "FFFFFFFF";

pub fn style_header_row(sheet: &mut Worksheet, headers: &[HeaderSpec]) {
    style_header_cells(sheet, 1, headers.len() as u32);
    set_column_widths(sheet, headers);
}

pub fn style_header_cells(sheet: &mut Worksheet, row: u32, columns: u32) {
    for col in 1..=columns {
        apply_header_style(sheet.get_style_mut((col, row)));
    }
}

pub fn set_column_widths(sheet: &mut Worksheet, headers: &[HeaderSpec]) {
    for (idx, header) in headers.iter().enumerate() {
        let col = idx as u32 + 1;
        let dimension = sheet.get_column_dimension_by_number_mut(&col);
        dimension.set_width(header.width);
        dimension.set_best_fit(false);
        dimension.set_auto_width(false);
    }
}

fn apply_header_style(style: &mut Style) {
    style
        .get_fill_mut()
        .get_pattern_fill_mut()
        .set_pattern_type(PatternValues::Solid)
        .get_foreground_color_mut()
        .set_argb(HEADER_FILL_ARGB);

    let font = style.get_font_mut();
    font.set_bold(true);
    font.get_color_mut().set_argb(HEADER_FONT_ARGB);

    let alignment = style.get_alignment_mut();
    alignment.set_horizontal(HorizontalAlignmentValues::Center);
    alignment.set_vertical(VerticalAlignmentValues::Center);
    alignment.set_wrap_text(true);
}

pub fn apply_thin_border(style: &mut Style) {
    let borders = style.get_borders_mut();
    borders.get_left_border_mut().set_border_style(Border::BORDER_THIN);
    borders.get_right_border_mut().set_border_style(Border::BORDER_THIN);
    borders.get_top_border_mut().set_border_style(Border::BORDER_THIN);
    borders.get_bottom_border_mut().set_border_style(Border::BORDER_THIN);
}

/// Borders every cell of the used range and aligns the data rows. Runs once
/// per batch, right before the save.
pub fn finish_formatting(sheet: &mut Worksheet, max_row: u32, max_col: u32) {
    for row in 1..=max_row {
        for col in 1..=max_col {
            let style = sheet.get_style_mut((col, row));
            apply_thin_border(style);
            if row > 1 {
                let alignment = style.get_alignment_mut();
                alignment.set_horizontal(HorizontalAlignmentValues::Left);
                alignment.set_vertical(VerticalAlignmentValues::Center);
            }
        }
    }
}

/// Flattened view of the formatting this crate applies, for inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellStyleSummary {
    pub bold: bool,
    pub font_argb: Option<String>,
    pub fill_argb: Option<String>,
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub bordered: bool,
}

pub fn summarize_style(style: &Style) -> CellStyleSummary {
    let mut summary = CellStyleSummary::default();

    if let Some(font) = style.get_font() {
        summary.bold = *font.get_bold();
        summary.font_argb = Some(font.get_color().get_argb().to_string()).filter(|s| !s.is_empty());
    }

    summary.fill_argb = style
        .get_fill()
        .and_then(|fill| fill.get_pattern_fill())
        .and_then(|pattern| pattern.get_foreground_color())
        .map(|color| color.get_argb().to_string())
        .filter(|s| !s.is_empty());

    if let Some(alignment) = style.get_alignment() {
        if alignment.get_horizontal() != &HorizontalAlignmentValues::General {
            summary.horizontal = Some(alignment.get_horizontal().get_value_string().to_string());
        }
        if alignment.get_vertical() != &VerticalAlignmentValues::Bottom {
            summary.vertical = Some(alignment.get_vertical().get_value_string().to_string());
        }
    }

    summary.bordered = style.get_borders().is_some_and(|borders| {
        [
            borders.get_left_border(),
            borders.get_right_border(),
            borders.get_top_border(),
            borders.get_bottom_border(),
        ]
        .iter()
        .all(|side| side.get_border_style().eq_ignore_ascii_case(Border::BORDER_THIN))
    });

    summary
}
