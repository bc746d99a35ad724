use chrono::{DateTime, Utc};

use super::grade::Grade;

/// Everything the document template needs, snapshotted at issuance time.
#[derive(Debug, Clone)]
pub struct CertificateDisplayData {
    pub user_name: String,
    pub course_title: String,
    pub grade: Grade,
    pub final_score: f64,
    pub completion_date: DateTime<Utc>,
    pub certificate_id: String,
    pub verification_code: String,
    pub issuer_name: String,
    pub signatory_name: String,
    pub signatory_role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One element of the document, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text {
        content: String,
        size: u8,
        bold: bool,
        align: Align,
    },
    /// Vertical gap, in line heights.
    Spacer(f64),
    /// Side-by-side cells, each a column of blocks (signature row).
    Row(Vec<Vec<Block>>),
}

/// A full single-page document description.
///
/// This is the unit-testable half of the renderer: building it touches no
/// PDF library, so template content can be asserted on directly.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub title: String,
    /// Page width and height in millimeters (A4 landscape).
    pub page_size_mm: (f64, f64),
    pub margin_mm: u32,
    pub blocks: Vec<Block>,
}

impl DocumentLayout {
    /// All text content in reading order, for assertions and debugging.
    pub fn text_contents(&self) -> Vec<&str> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    Block::Text { content, .. } => out.push(content),
                    Block::Spacer(_) => {}
                    Block::Row(cells) => {
                        for cell in cells {
                            walk(cell, out);
                        }
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_contents().iter().any(|t| t.contains(needle))
    }
}

const PAGE_A4_LANDSCAPE_MM: (f64, f64) = (297.0, 210.0);
const SIGNATURE_RULE: &str = "______________________________";

fn text(content: impl Into<String>, size: u8, bold: bool, align: Align) -> Block {
    Block::Text {
        content: content.into(),
        size,
        bold,
        align,
    }
}

/// Format a score for display: whole numbers drop the decimal point.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Build the fixed certificate template for one issuance.
pub fn certificate_layout(data: &CertificateDisplayData) -> DocumentLayout {
    let blocks = vec![
        text(&data.issuer_name, 14, false, Align::Center),
        Block::Spacer(1.0),
        text("CERTIFICATE OF COMPLETION", 28, true, Align::Center),
        Block::Spacer(1.5),
        text("This is to certify that", 12, false, Align::Center),
        Block::Spacer(0.5),
        text(data.user_name.to_uppercase(), 22, true, Align::Center),
        Block::Spacer(0.5),
        text("has successfully completed the course", 12, false, Align::Center),
        Block::Spacer(0.5),
        text(format!("\"{}\"", data.course_title), 16, true, Align::Center),
        Block::Spacer(1.0),
        text(
            format!(
                "Awarded the grade of {} with a final score of {}%",
                data.grade.label(),
                format_score(data.final_score)
            ),
            12,
            false,
            Align::Center,
        ),
        text(
            format!("Completed on {}", format_date(&data.completion_date)),
            12,
            false,
            Align::Center,
        ),
        Block::Spacer(2.5),
        Block::Row(vec![
            vec![
                text(SIGNATURE_RULE, 11, false, Align::Center),
                text(&data.signatory_name, 11, true, Align::Center),
                text(&data.signatory_role, 10, false, Align::Center),
            ],
            vec![
                text(SIGNATURE_RULE, 11, false, Align::Center),
                text(format_date(&data.completion_date), 11, true, Align::Center),
                text("Date of Issue", 10, false, Align::Center),
            ],
        ]),
        Block::Spacer(1.5),
        text(
            format!("Certificate ID: {}", data.certificate_id),
            9,
            false,
            Align::Center,
        ),
        text(
            format!(
                "To verify this certificate, present code {} to {}",
                data.verification_code, data.issuer_name
            ),
            9,
            false,
            Align::Center,
        ),
    ];

    DocumentLayout {
        title: format!("Certificate of Completion - {}", data.user_name),
        page_size_mm: PAGE_A4_LANDSCAPE_MM,
        margin_mm: 20,
        blocks,
    }
}
