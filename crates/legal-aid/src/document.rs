//! Document assembly: rendered template text → structured letter → typed layout blocks →
//! bytes via a `LayoutRenderer`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SIGNATURE_LINES: [&str; 6] = [
    "Sincerely,",
    "",
    "",
    "______________________________",
    "[Your Name]",
    "[Your Title/Relationship]",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub heading: Option<String>,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderedDocument {
    pub title: String,
    pub date_line: String,
    pub sections: Vec<Section>,
    pub signature_block: Vec<String>,
}

/// Split `text` on blank lines into headed sections and append the signature block.
///
/// Blocks are trimmed and empty ones dropped. A block starting with `#` opens a new
/// section whose heading is the block with its leading `#` characters removed.
pub fn assemble(text: &str, title: &str, date: &str) -> RenderedDocument {
    let text = text.replace("\r\n", "\n");
    let mut sections: Vec<Section> = Vec::new();

    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        if let Some(heading) = block.strip_prefix('#') {
            sections.push(Section {
                heading: Some(heading.trim_start_matches('#').trim().to_string()),
                paragraphs: Vec::new(),
            });
            continue;
        }
        match sections.last_mut() {
            Some(section) => section.paragraphs.push(block.to_string()),
            None => sections.push(Section {
                heading: None,
                paragraphs: vec![block.to_string()],
            }),
        }
    }

    RenderedDocument {
        title: title.to_string(),
        date_line: format!("Date: {date}"),
        sections,
        signature_block: SIGNATURE_LINES.iter().map(|l| l.to_string()).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    Body,
    Date,
    Signature,
}

/// One element of the flat layout stream handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutBlock {
    Title(String),
    Heading(String),
    Paragraph { text: String, style: TextStyle },
    /// Vertical gap in points.
    Spacer(u32),
}

impl LayoutBlock {
    fn paragraph(text: impl Into<String>, style: TextStyle) -> Self {
        LayoutBlock::Paragraph {
            text: text.into(),
            style,
        }
    }
}

pub fn to_blocks(document: &RenderedDocument) -> Vec<LayoutBlock> {
    let mut blocks = vec![
        LayoutBlock::Title(document.title.clone()),
        LayoutBlock::Spacer(12),
        LayoutBlock::paragraph(&document.date_line, TextStyle::Date),
        LayoutBlock::Spacer(12),
    ];

    for section in &document.sections {
        if let Some(heading) = &section.heading {
            blocks.push(LayoutBlock::Heading(heading.clone()));
        }
        for paragraph in &section.paragraphs {
            blocks.push(LayoutBlock::paragraph(paragraph, TextStyle::Body));
            blocks.push(LayoutBlock::Spacer(6));
        }
    }

    blocks.push(LayoutBlock::Spacer(24));
    for line in &document.signature_block {
        blocks.push(LayoutBlock::paragraph(line, TextStyle::Signature));
        if line.is_empty() {
            blocks.push(LayoutBlock::Spacer(12));
        }
    }
    blocks
}

/// Page size and margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    pub const US_LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin_left: 72.0,
        margin_right: 72.0,
        margin_top: 72.0,
        margin_bottom: 18.0,
    };

    pub fn content_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::US_LETTER
    }
}

/// Serializes a layout stream into a paginated file format.
pub trait LayoutRenderer: Send + Sync {
    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, blocks: &[LayoutBlock], geometry: &PageGeometry) -> Result<Vec<u8>, AppError>;
}

/// Fixed-pitch text output: word-wrapped lines, pages separated by a form feed.
#[derive(Debug, Clone, Copy)]
pub struct PlainTextRenderer {
    pub points_per_char: f32,
    pub points_per_line: f32,
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self {
            points_per_char: 6.0,
            points_per_line: 12.0,
        }
    }
}

impl PlainTextRenderer {
    fn columns(&self, geometry: &PageGeometry) -> usize {
        ((geometry.content_width() / self.points_per_char) as usize).max(1)
    }

    fn lines_per_page(&self, geometry: &PageGeometry) -> usize {
        ((geometry.content_height() / self.points_per_line) as usize).max(1)
    }

    fn spacer_lines(&self, points: u32) -> usize {
        (points as f32 / self.points_per_line).ceil() as usize
    }
}

impl LayoutRenderer for PlainTextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, blocks: &[LayoutBlock], geometry: &PageGeometry) -> Result<Vec<u8>, AppError> {
        let columns = self.columns(geometry);
        let mut pages = Paginator::new(self.lines_per_page(geometry));

        for block in blocks {
            match block {
                LayoutBlock::Title(text) => {
                    for line in wrap(text, columns) {
                        pages.push(center(&line, columns));
                    }
                }
                LayoutBlock::Heading(text) => {
                    pages.push_blank();
                    for line in wrap(text, columns) {
                        pages.push(line);
                    }
                    pages.push_blank();
                }
                LayoutBlock::Paragraph { text, style } => {
                    if text.is_empty() {
                        pages.push(String::new());
                    }
                    for source_line in text.lines() {
                        for line in wrap(source_line, columns) {
                            match style {
                                TextStyle::Date => pages.push(right_align(&line, columns)),
                                TextStyle::Body | TextStyle::Signature => pages.push(line),
                            }
                        }
                    }
                }
                LayoutBlock::Spacer(points) => {
                    for _ in 0..self.spacer_lines(*points) {
                        pages.push_blank();
                    }
                }
            }
        }

        Ok(pages.finish().into_bytes())
    }
}

/// Collects lines into pages. Blank lines at the top of a page are dropped.
struct Paginator {
    lines_per_page: usize,
    pages: Vec<Vec<String>>,
}

impl Paginator {
    fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page,
            pages: vec![Vec::new()],
        }
    }

    fn push(&mut self, line: String) {
        let full = self
            .pages
            .last()
            .is_some_and(|page| page.len() >= self.lines_per_page);
        if full {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(line.trim_end().to_string());
        }
    }

    fn push_blank(&mut self) {
        let at_top = self.pages.last().is_none_or(|page| page.is_empty());
        let full = self
            .pages
            .last()
            .is_some_and(|page| page.len() >= self.lines_per_page);
        if !at_top && !full {
            self.push(String::new());
        }
    }

    fn finish(self) -> String {
        self.pages
            .into_iter()
            .map(|page| {
                let mut text = page.join("\n");
                text.push('\n');
                text
            })
            .collect::<Vec<_>>()
            .join("\u{000C}")
    }
}

/// Greedy word wrap. Words longer than `width` are split across lines.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn center(line: &str, width: usize) -> String {
    let pad = width.saturating_sub(line.chars().count()) / 2;
    format!("{}{line}", " ".repeat(pad))
}

fn right_align(line: &str, width: usize) -> String {
    let pad = width.saturating_sub(line.chars().count());
    format!("{}{line}", " ".repeat(pad))
}

/// Where and how generated documents are written.
#[derive(Clone)]
pub struct DocumentOutput {
    pub dir: PathBuf,
    pub renderer: Arc<dyn LayoutRenderer>,
    pub geometry: PageGeometry,
    pub io_timeout: Duration,
}

impl DocumentOutput {
    pub fn plain_text(dir: PathBuf) -> Self {
        Self {
            dir,
            renderer: Arc::new(PlainTextRenderer::default()),
            geometry: PageGeometry::US_LETTER,
            io_timeout: Duration::from_secs(10),
        }
    }

    /// Render `document` and write it as `{stem}.{ext}` under the output directory.
    pub async fn write(&self, stem: &str, document: &RenderedDocument) -> Result<PathBuf, AppError> {
        let bytes = self.renderer.render(&to_blocks(document), &self.geometry)?;
        let path = self.dir.join(format!("{stem}.{}", self.renderer.extension()));

        let io = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, &bytes).await
        };
        match tokio::time::timeout(self.io_timeout, io).await {
            Ok(Ok(())) => Ok(path),
            Ok(Err(e)) => Err(AppError::Output(format!("{}: {e}", path.display()))),
            Err(_) => Err(AppError::Output(format!(
                "writing {} timed out after {}s",
                path.display(),
                self.io_timeout.as_secs()
            ))),
        }
    }
}
