use genpdf::elements::{Break, LinearLayout, Paragraph, TableLayout};
use genpdf::fonts::{self, FontData, FontFamily};
use genpdf::{Alignment, Document, Element as _, SimplePageDecorator, Size};
use thiserror::Error;

use super::layout::{Align, Block, DocumentLayout};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no usable font family found; install fonts-liberation or similar")]
    FontsUnavailable,
    #[error("pdf generation failed: {0}")]
    Backend(String),
}

impl From<genpdf::error::Error> for RenderError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Backend that turns a `DocumentLayout` into bytes.
///
/// A trait seam so the orchestrator's state machine can be tested without a
/// PDF library or fonts on the test host.
pub trait CertificateRenderer: Send + Sync {
    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, RenderError>;
}

/// genpdf-backed renderer. Fonts are discovered once at construction so a
/// misconfigured host fails at startup, not mid-issuance.
pub struct PdfRenderer {
    font_family: FontFamily<FontData>,
}

/// Common font locations; genpdf needs real font files for metrics.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/System/Library/Fonts/Supplemental",
    "/Library/Fonts",
];

const FONT_NAMES: &[&str] = &["LiberationSans", "DejaVuSans", "Arial"];

impl PdfRenderer {
    pub fn discover() -> Result<Self, RenderError> {
        let font_family = FONT_DIRS
            .iter()
            .filter(|dir| std::path::Path::new(dir).exists())
            .find_map(|dir| {
                FONT_NAMES
                    .iter()
                    .find_map(|name| fonts::from_files(dir, name, None).ok())
            })
            .ok_or(RenderError::FontsUnavailable)?;

        Ok(Self { font_family })
    }

    fn push_block(target: &mut LinearLayout, block: &Block) -> Result<(), RenderError> {
        match block {
            Block::Text {
                content,
                size,
                bold,
                align,
            } => {
                let mut style = genpdf::style::Style::new().with_font_size(*size);
                if *bold {
                    style = style.bold();
                }
                let alignment = match align {
                    Align::Left => Alignment::Left,
                    Align::Center => Alignment::Center,
                    Align::Right => Alignment::Right,
                };
                target.push(Paragraph::new(content).aligned(alignment).styled(style));
            }
            Block::Spacer(lines) => {
                target.push(Break::new(*lines));
            }
            Block::Row(cells) => {
                let mut table = TableLayout::new(vec![1; cells.len()]);
                let mut row = table.row();
                for cell in cells {
                    let mut column = LinearLayout::vertical();
                    for inner in cell {
                        Self::push_block(&mut column, inner)?;
                    }
                    row = row.element(column);
                }
                row.push()
                    .map_err(|e| RenderError::Backend(e.to_string()))?;
                target.push(table);
            }
        }
        Ok(())
    }
}

impl CertificateRenderer for PdfRenderer {
    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::new(self.font_family.clone());
        doc.set_title(&layout.title);
        doc.set_paper_size(Size::new(layout.page_size_mm.0, layout.page_size_mm.1));

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(layout.margin_mm);
        doc.set_page_decorator(decorator);

        let mut body = LinearLayout::vertical();
        for block in &layout.blocks {
            Self::push_block(&mut body, block)?;
        }
        doc.push(body);

        let mut buf = Vec::new();
        doc.render(&mut buf)?;
        Ok(buf)
    }
}
