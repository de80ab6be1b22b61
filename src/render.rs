//! Line-based renderer for the markdown subset the model is asked to produce.
//!
//! Every line is classified on its own: `## ` and `### ` headings, `* `
//! bullets, and everything else as a paragraph. There is no inline
//! emphasis handling and no merging across blank lines.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedBlock {
    Heading2(String),
    Heading3(String),
    BulletItem(String),
    Paragraph(String),
}

/// Classify a single line by its prefix.
pub fn classify_line(line: &str) -> RenderedBlock {
    if let Some(rest) = line.strip_prefix("### ") {
        RenderedBlock::Heading3(rest.to_string())
    } else if let Some(rest) = line.strip_prefix("## ") {
        RenderedBlock::Heading2(rest.to_string())
    } else if let Some(rest) = line.strip_prefix("* ") {
        RenderedBlock::BulletItem(rest.to_string())
    } else {
        RenderedBlock::Paragraph(line.to_string())
    }
}

/// One block per input line, in source order. Empty input yields a single
/// empty paragraph, and a trailing newline yields a trailing empty one.
pub fn render_blocks(text: &str) -> Vec<RenderedBlock> {
    text.split('\n')
        .map(|line| classify_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}
