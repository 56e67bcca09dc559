//! PDF rendering via `printpdf`.
//!
//! Layout runs top-down in millimetres (`cursor` = distance from the top
//! edge) and is converted to PDF's bottom-up coordinates when drawing.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::*;

use super::layout::{
    wrap_text, PatientSection, ReportDocument, Section, SectionContent, Table, PRIMARY_RGB,
};
use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 14.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_LEFT;
const TOP: f32 = 20.0;
/// Lowest cursor position content may reach.
const BOTTOM_LIMIT: f32 = PAGE_HEIGHT - 15.0;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

fn char_width_mm(font_size: f32) -> f32 {
    font_size * AVG_GLYPH_EM * PT_TO_MM
}

fn max_chars(width_mm: f32, font_size: f32) -> usize {
    (width_mm / char_width_mm(font_size)).floor().max(1.0) as usize
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn black() -> Color {
    rgb(0, 0, 0)
}

fn grey() -> Color {
    rgb(100, 100, 100)
}

/// Page-aware drawing surface.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Font(e.to_string()))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            cursor: TOP,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = TOP;
    }

    /// Starts a new page if fewer than `height` millimetres remain.
    fn ensure_room(&mut self, height: f32) {
        if self.cursor + height > BOTTOM_LIMIT {
            self.new_page();
        }
    }

    fn break_if_past(&mut self, threshold: Option<f32>) {
        if let Some(threshold) = threshold {
            if self.cursor > threshold {
                self.new_page();
            }
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, top: f32, bold: bool, color: Color) {
        self.layer.set_fill_color(color);
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - top), font);
    }

    fn centered(&self, text: &str, size: f32, top: f32, bold: bool, color: Color) {
        let width = text.chars().count() as f32 * char_width_mm(size);
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN_LEFT);
        self.text(text, size, x, top, bold, color);
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32, mode: PaintMode) {
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - top - height),
            Mm(x + width),
            Mm(PAGE_HEIGHT - top),
        )
        .with_mode(mode);
        self.layer.add_rect(rect);
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Save(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| ReportError::Save(format!("PDF buffer error: {e}")))
    }
}

/// Renders the report. Returns PDF bytes and the page count.
pub fn render(doc: &ReportDocument) -> Result<(Vec<u8>, usize), ReportError> {
    let mut canvas = Canvas::new(&doc.title)?;

    // Header
    let (r, g, b) = PRIMARY_RGB;
    canvas.centered(&doc.title, 20.0, canvas.cursor, true, rgb(r, g, b));
    canvas.cursor += 10.0;
    canvas.centered(&doc.generated, 10.0, canvas.cursor, false, grey());
    canvas.cursor += 15.0;

    draw_patient(&mut canvas, &doc.patient);
    canvas.cursor += 10.0;

    for section in [&doc.episodes, &doc.missed_medications].into_iter().flatten() {
        draw_section(&mut canvas, section);
    }

    let pages = canvas.pages;
    let bytes = canvas.finish()?;
    tracing::debug!(pages, bytes = bytes.len(), "Report rendered");
    Ok((bytes, pages))
}

fn draw_patient(canvas: &mut Canvas, patient: &PatientSection) {
    canvas.text(&patient.heading, 14.0, MARGIN_LEFT, canvas.cursor, true, black());
    canvas.cursor += 7.0;

    for line in &patient.lines {
        canvas.ensure_room(6.0);
        canvas.text(line, 10.0, MARGIN_LEFT, canvas.cursor, false, black());
        canvas.cursor += 6.0;
    }

    if let Some((label, notes)) = &patient.notes {
        canvas.ensure_room(5.0);
        canvas.text(label, 10.0, MARGIN_LEFT, canvas.cursor, false, black());
        canvas.cursor += 5.0;
        for line in wrap_text(notes, max_chars(180.0, 9.0)) {
            canvas.ensure_room(4.0);
            canvas.text(&line, 9.0, MARGIN_LEFT, canvas.cursor, false, black());
            canvas.cursor += 4.0;
        }
        canvas.cursor += 5.0;
    }
}

fn draw_section(canvas: &mut Canvas, section: &Section) {
    canvas.break_if_past(section.break_after_mm);
    canvas.ensure_room(14.0);
    canvas.text(&section.heading, 14.0, MARGIN_LEFT, canvas.cursor, true, black());
    canvas.cursor += 7.0;

    match &section.content {
        SectionContent::Table(table) => {
            draw_table(canvas, table);
            canvas.cursor += 15.0;
        }
        SectionContent::Empty(message) => {
            canvas.text(message, 10.0, MARGIN_LEFT, canvas.cursor, false, grey());
            canvas.cursor += 15.0;
        }
    }
}

/// Grid table with a filled header row repeated on every page.
fn draw_table(canvas: &mut Canvas, table: &Table) {
    let style = &table.style;
    let widths = style.resolve_widths(table.head.len(), CONTENT_WIDTH);
    let line_height = style.font_size * PT_TO_MM * 1.15;

    let wrap_row = |row: &[String]| -> (Vec<Vec<String>>, f32) {
        let cells: Vec<Vec<String>> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let inner = (width - 2.0 * style.cell_padding).max(1.0);
                wrap_text(cell, max_chars(inner, style.font_size))
            })
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        let height = lines as f32 * line_height + 2.0 * style.cell_padding;
        (cells, height)
    };

    let (head_cells, head_height) = wrap_row(&table.head);
    let draw_row = |canvas: &Canvas, cells: &[Vec<String>], height: f32, header: bool| {
        let mut x = MARGIN_LEFT;
        for (lines, width) in cells.iter().zip(&widths) {
            if header {
                let (r, g, b) = PRIMARY_RGB;
                canvas.layer.set_fill_color(rgb(r, g, b));
                canvas.rect(x, canvas.cursor, *width, height, PaintMode::Fill);
            } else {
                canvas.layer.set_outline_color(rgb(200, 200, 200));
                canvas.layer.set_outline_thickness(0.5);
                canvas.rect(x, canvas.cursor, *width, height, PaintMode::Stroke);
            }
            let color = if header { rgb(255, 255, 255) } else { black() };
            let mut top = canvas.cursor + style.cell_padding + style.font_size * PT_TO_MM;
            for line in lines {
                canvas.text(line, style.font_size, x + style.cell_padding, top, header, color.clone());
                top += line_height;
            }
            x += width;
        }
    };

    canvas.ensure_room(head_height);
    draw_row(canvas, &head_cells, head_height, true);
    canvas.cursor += head_height;

    for row in &table.body {
        let (cells, height) = wrap_row(row);
        if canvas.cursor + height > BOTTOM_LIMIT {
            canvas.new_page();
            draw_row(canvas, &head_cells, head_height, true);
            canvas.cursor += head_height;
        }
        draw_row(canvas, &cells, height, false);
        canvas.cursor += height;
    }
}
