use std::io::BufWriter;

use printpdf::*;

use crate::error::{Result, TallyError};
use crate::flow::ChartRenderer;
use crate::stats::DailyPoint;

// US Letter, landscape (mm)
const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const TITLE_SIZE: f32 = 16.0;
const TICK_SIZE: f32 = 6.0;
const AXIS_GUTTER: f32 = 14.0;
const Y_TICKS: i64 = 4;

const INCOME_COLOR: (f32, f32, f32) = (0.18, 0.60, 0.25);
const EXPENSE_COLOR: (f32, f32, f32) = (0.78, 0.20, 0.20);

/// Grouped bar chart of a daily series, one income and one expense bar per
/// date, produced as a single-page PDF.
#[derive(Debug, Default)]
pub struct PdfChart;

impl ChartRenderer for PdfChart {
    fn render(&self, series: &[DailyPoint]) -> Result<Vec<u8>> {
        render_chart(series)
    }
}

fn filled_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32) {
    let rect = Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ]],
        mode: path::PaintMode::Fill,
        winding_order: path::WindingOrder::NonZero,
    };
    layer.add_polygon(rect);
}

fn hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32) {
    layer.set_outline_thickness(0.3);
    let line = Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

pub fn render_chart(series: &[DailyPoint]) -> Result<Vec<u8>> {
    if series.is_empty() {
        return Err(TallyError::Chart("Nothing to chart: empty series".to_string()));
    }

    let (doc, page, layer) =
        PdfDocument::new("Income and expenses by day", Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TallyError::Chart(format!("{e:?}")))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TallyError::Chart(format!("{e:?}")))?;
    let layer = doc.get_page(page).get_layer(layer);

    layer.use_text(
        "Income and expenses by day",
        TITLE_SIZE,
        Mm(MARGIN_LEFT),
        Mm(PAGE_H - MARGIN_TOP),
        &font_bold,
    );

    // Plot frame
    let x0 = MARGIN_LEFT + AXIS_GUTTER;
    let x1 = PAGE_W - MARGIN_RIGHT;
    let y0 = MARGIN_BOTTOM + 8.0;
    let y1 = PAGE_H - MARGIN_TOP - 14.0;

    let max_value = series
        .iter()
        .map(|p| p.income.max(p.expense))
        .max()
        .unwrap_or(0)
        .max(1);

    // Horizontal gridlines with value labels
    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    for tick in 0..=Y_TICKS {
        let value = max_value * tick / Y_TICKS;
        let y = y0 + (y1 - y0) * tick as f32 / Y_TICKS as f32;
        hline(&layer, x0, x1, y);
        layer.use_text(
            crate::fmt::amount(value),
            TICK_SIZE,
            Mm(MARGIN_LEFT),
            Mm(y - 1.0),
            &font,
        );
    }

    // Bars: two per date, income left, expense right
    let group_w = (x1 - x0) / series.len() as f32;
    let bar_w = group_w * 0.35;
    let label_step = if series.len() > 20 { 2 } else { 1 };

    for (i, point) in series.iter().enumerate() {
        let group_x = x0 + group_w * i as f32;
        let center = group_x + group_w / 2.0;

        let income_h = (y1 - y0) * point.income as f32 / max_value as f32;
        if income_h > 0.0 {
            layer.set_fill_color(Color::Rgb(Rgb::new(
                INCOME_COLOR.0,
                INCOME_COLOR.1,
                INCOME_COLOR.2,
                None,
            )));
            filled_rect(&layer, center - bar_w, y0, bar_w, income_h);
        }

        let expense_h = (y1 - y0) * point.expense as f32 / max_value as f32;
        if expense_h > 0.0 {
            layer.set_fill_color(Color::Rgb(Rgb::new(
                EXPENSE_COLOR.0,
                EXPENSE_COLOR.1,
                EXPENSE_COLOR.2,
                None,
            )));
            filled_rect(&layer, center, y0, bar_w, expense_h);
        }

        if i % label_step == 0 {
            let label = point.date.format("%m-%d").to_string();
            layer.use_text(label, TICK_SIZE, Mm(center - 3.5), Mm(y0 - 4.0), &font);
        }
    }

    // Legend
    let legend_y = y1 + 6.0;
    layer.set_fill_color(Color::Rgb(Rgb::new(
        INCOME_COLOR.0,
        INCOME_COLOR.1,
        INCOME_COLOR.2,
        None,
    )));
    filled_rect(&layer, x0, legend_y, 4.0, 3.0);
    layer.use_text("Income", 8.0, Mm(x0 + 5.5), Mm(legend_y), &font);
    layer.set_fill_color(Color::Rgb(Rgb::new(
        EXPENSE_COLOR.0,
        EXPENSE_COLOR.1,
        EXPENSE_COLOR.2,
        None,
    )));
    filled_rect(&layer, x0 + 28.0, legend_y, 4.0, 3.0);
    layer.use_text("Expense", 8.0, Mm(x0 + 33.5), Mm(legend_y), &font);

    let mut bytes: Vec<u8> = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .map_err(|e| TallyError::Chart(format!("{e:?}")))?;
    Ok(bytes)
}
