//! Structural normalization.
//!
//! The builder leaves shape ids in the tree; this pass resolves them
//! against DocInfo into concrete attributes, merges fragmented runs, and
//! infers headings and list items from paragraph shapes. It is pure and
//! total: unresolvable ids fall back to default formatting, because losing
//! a font attribute is acceptable and losing the document is not. After
//! this pass the tree carries no references and DocInfo can be dropped.

use unicode_normalization::UnicodeNormalization;

use crate::model::{Block, Document, InlineContent, ListInfo, Paragraph, TextStyle};
use crate::parser::doc_info::{DocInfo, HeadingKind};

/// Normalize a built document in place.
pub fn normalize(document: &mut Document, doc_info: &DocInfo) {
    for section in &mut document.sections {
        for block in &mut section.blocks {
            normalize_block(block, doc_info);
        }
    }
}

fn normalize_block(block: &mut Block, doc_info: &DocInfo) {
    match block {
        Block::Paragraph(paragraph) => normalize_paragraph(paragraph, doc_info),
        Block::Table(table) => {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    for paragraph in &mut cell.content {
                        normalize_paragraph(paragraph, doc_info);
                    }
                }
            }
        }
        Block::Opaque { .. } => {}
    }
}

fn normalize_paragraph(paragraph: &mut Paragraph, doc_info: &DocInfo) {
    resolve_runs(paragraph, doc_info);
    merge_runs(paragraph);
    apply_para_shape(paragraph, doc_info);
}

/// Copy each run's character shape into a concrete style and clear the id.
fn resolve_runs(paragraph: &mut Paragraph, doc_info: &DocInfo) {
    for item in &mut paragraph.content {
        let InlineContent::Text(run) = item else {
            continue;
        };

        if let Some(id) = run.char_shape_id.take() {
            match doc_info.char_shape(id) {
                Some(shape) => run.style = shape.to_text_style(),
                None => {
                    log::debug!("char shape {id} not in DocInfo, using default style");
                    run.style = TextStyle::default();
                }
            }
        }
        run.text = run.text.nfc().collect();
    }
}

/// Merge consecutive runs with identical resolved styles.
///
/// The source format splits runs per edit; merging undoes that
/// fragmentation so renderers emit one span per styled range.
fn merge_runs(paragraph: &mut Paragraph) {
    let mut merged: Vec<InlineContent> = Vec::with_capacity(paragraph.content.len());

    for item in paragraph.content.drain(..) {
        if let (InlineContent::Text(run), Some(InlineContent::Text(last))) =
            (&item, merged.last_mut())
        {
            if run.style == last.style {
                last.text.push_str(&run.text);
                continue;
            }
        }
        merged.push(item);
    }

    paragraph.content = merged;
}

/// Map the paragraph shape to alignment, heading level, and list info.
fn apply_para_shape(paragraph: &mut Paragraph, doc_info: &DocInfo) {
    let Some(id) = paragraph.style.para_shape_id.take() else {
        return;
    };
    let Some(shape) = doc_info.para_shape(id) else {
        log::debug!("para shape {id} not in DocInfo, leaving paragraph unstyled");
        return;
    };

    paragraph.style.alignment = shape.alignment;
    match shape.heading {
        HeadingKind::Outline => {
            paragraph.style.heading_level = Some((shape.heading_level + 1).clamp(1, 6));
        }
        HeadingKind::Number => {
            paragraph.style.list_info = Some(ListInfo::numbered(shape.heading_level, 1));
        }
        HeadingKind::Bullet => {
            paragraph.style.list_info = Some(ListInfo::bullet(shape.heading_level));
        }
        HeadingKind::None => {}
    }
}
