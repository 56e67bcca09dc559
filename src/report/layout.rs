//! Renderer-independent report layout: what goes on the page, in order.

/// Header fill colour for tables and the title (RGB, 0-255).
pub const PRIMARY_RGB: (u8, u8, u8) = (30, 58, 138);

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub generated: String,
    pub patient: PatientSection,
    pub episodes: Option<Section>,
    pub missed_medications: Option<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientSection {
    pub heading: String,
    pub lines: Vec<String>,
    /// Label plus free text, wrapped in a smaller font.
    pub notes: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    /// Start a new page first if the cursor is already below this many
    /// millimetres from the top.
    pub break_after_mm: Option<f32>,
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionContent {
    Table(Table),
    /// Greyed-out message shown instead of an empty table.
    Empty(String),
}

impl Section {
    pub fn table(&self) -> Option<&Table> {
        match &self.content {
            SectionContent::Table(table) => Some(table),
            SectionContent::Empty(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub style: TableStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub cell_padding: f32,
    /// Fixed widths in millimetres, by column index. Other columns share
    /// the remaining width equally.
    pub column_widths: Vec<(usize, f32)>,
}

impl TableStyle {
    pub fn new(font_size: f32, cell_padding: f32) -> Self {
        Self {
            font_size,
            cell_padding,
            column_widths: Vec::new(),
        }
    }

    pub fn with_column_width(mut self, column: usize, width: f32) -> Self {
        self.column_widths.push((column, width));
        self
    }

    /// Resolves every column's width for a table `total` millimetres wide.
    pub fn resolve_widths(&self, columns: usize, total: f32) -> Vec<f32> {
        let fixed: Vec<Option<f32>> = (0..columns)
            .map(|c| {
                self.column_widths
                    .iter()
                    .find(|(col, _)| *col == c)
                    .map(|(_, w)| *w)
            })
            .collect();
        let fixed_total: f32 = fixed.iter().flatten().sum();
        let flexible = fixed.iter().filter(|w| w.is_none()).count();
        let share = if flexible == 0 {
            0.0
        } else {
            ((total - fixed_total) / flexible as f32).max(0.0)
        };
        fixed.into_iter().map(|w| w.unwrap_or(share)).collect()
    }
}

/// Simple word-wrap helper for PDF text rendering.
///
/// Words longer than `max_chars` are split so no line overflows.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let current_len = current.chars().count();
            if current_len + word.chars().count() + 1 > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
