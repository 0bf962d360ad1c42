//! BodyText section building.
//!
//! A section stream is a flat record sequence whose nesting levels encode a
//! tree. The builder reconstructs that tree with an explicit stack of open
//! nodes indexed by level, then interprets the known structural tags into
//! model blocks. Unknown tags are preserved as opaque blocks in traversal
//! order rather than dropped or rejected.

use crate::error::{Error, Result};
use crate::model::{
    Block, InlineContent, Paragraph, Section, Table, TableCell, TableRow, TextRun,
};
use crate::parser::record::{
    RecordCursor, HWPTAG_CTRL_HEADER, HWPTAG_LIST_HEADER, HWPTAG_PARA_CHAR_SHAPE,
    HWPTAG_PARA_HEADER, HWPTAG_PARA_LINE_SEG, HWPTAG_PARA_TEXT, HWPTAG_TABLE,
};

/// Control id of an anchored table ("tbl " FourCC).
const CTRL_TABLE: u32 = u32::from_be_bytes(*b"tbl ");

/// An owned record with its children resolved from level transitions.
#[derive(Debug, Clone)]
struct RecordNode {
    tag_id: u16,
    payload: Vec<u8>,
    children: Vec<RecordNode>,
}

/// Build the record tree for one stream.
///
/// The stack holds the currently open ancestor at each level; a record at
/// level L pops to depth L and pushes itself as a child of the new top. A
/// record opening deeper than one past the current depth violates the level
/// invariant and fails with [`Error::MalformedLevelSequence`].
fn build_record_tree(data: &[u8], stream: &str) -> Result<Vec<RecordNode>> {
    let mut roots: Vec<RecordNode> = Vec::new();
    let mut stack: Vec<RecordNode> = Vec::new();

    fn close(roots: &mut Vec<RecordNode>, stack: &mut Vec<RecordNode>, node: RecordNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    for record in RecordCursor::new(data, stream) {
        let record = record?;
        let level = record.level as usize;

        if level > stack.len() {
            return Err(Error::MalformedLevelSequence {
                stream: stream.to_string(),
                offset: record.offset,
                expected_max: stack.len() as u16,
                found: record.level,
            });
        }
        while stack.len() > level {
            let node = stack.pop().expect("stack checked non-empty");
            close(&mut roots, &mut stack, node);
        }
        stack.push(RecordNode {
            tag_id: record.tag_id,
            payload: record.payload.to_vec(),
            children: Vec::new(),
        });
    }

    while let Some(node) = stack.pop() {
        close(&mut roots, &mut stack, node);
    }

    Ok(roots)
}

/// Build one section from a decompressed BodyText stream.
///
/// An empty stream yields an empty section.
pub fn build_section(data: &[u8], stream: &str, index: u32) -> Result<Section> {
    let mut section = Section::new(index);
    if data.is_empty() {
        return Ok(section);
    }

    for node in build_record_tree(data, stream)? {
        match node.tag_id {
            HWPTAG_PARA_HEADER => interpret_paragraph(&node, &mut section.blocks),
            tag => {
                log::debug!("{stream}: unknown root record tag {tag}, preserving as opaque");
                section.blocks.push(Block::Opaque {
                    tag_id: tag,
                    data: node.payload,
                });
            }
        }
    }

    Ok(section)
}

/// Interpret a paragraph record and its children into blocks.
///
/// The paragraph itself comes first; tables anchored in it and any
/// uninterpreted child records follow it in traversal order.
fn interpret_paragraph(node: &RecordNode, blocks: &mut Vec<Block>) {
    let mut paragraph = Paragraph::new();
    paragraph.style.para_shape_id = parse_para_header(&node.payload);

    let mut shape_runs: Vec<(u32, u32)> = Vec::new();
    let mut text_payload: Option<&[u8]> = None;
    let mut trailing: Vec<Block> = Vec::new();

    for child in &node.children {
        match child.tag_id {
            HWPTAG_PARA_TEXT => text_payload = Some(&child.payload),
            HWPTAG_PARA_CHAR_SHAPE => shape_runs = parse_shape_runs(&child.payload),
            HWPTAG_PARA_LINE_SEG => {} // layout-only, no structural content
            HWPTAG_CTRL_HEADER => interpret_control(child, &mut trailing),
            tag => {
                log::debug!("unknown paragraph child tag {tag}, preserving as opaque");
                trailing.push(Block::Opaque {
                    tag_id: tag,
                    data: child.payload.clone(),
                });
            }
        }
    }

    if let Some(payload) = text_payload {
        paragraph.content = decode_para_text(payload, &shape_runs);
    }

    blocks.push(Block::Paragraph(paragraph));
    blocks.extend(trailing);
}

/// Paragraph shape id from a PARA_HEADER payload (u16 at offset 8).
fn parse_para_header(payload: &[u8]) -> Option<u32> {
    if payload.len() < 10 {
        return None;
    }
    Some(u16::from_le_bytes([payload[8], payload[9]]) as u32)
}

/// (position, char shape id) pairs from a PARA_CHAR_SHAPE payload.
fn parse_shape_runs(payload: &[u8]) -> Vec<(u32, u32)> {
    payload
        .chunks_exact(8)
        .map(|pair| {
            (
                u32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]),
                u32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]),
            )
        })
        .collect()
}

/// Interpret a control record: tables become model tables, everything else
/// is preserved opaquely.
fn interpret_control(node: &RecordNode, blocks: &mut Vec<Block>) {
    let ctrl_id = match node.payload.get(..4) {
        Some(bytes) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        None => 0,
    };

    if ctrl_id == CTRL_TABLE {
        if let Some(table) = build_table(node) {
            blocks.push(Block::Table(table));
            return;
        }
    }

    log::debug!("preserving control record 0x{ctrl_id:08X} as opaque");
    blocks.push(Block::Opaque {
        tag_id: node.tag_id,
        data: node.payload.clone(),
    });
}

/// Build a table from a "tbl " control node.
///
/// Children: one TABLE record carrying the grid dimensions, then one
/// LIST_HEADER per cell whose own children are the cell's paragraphs.
fn build_table(ctrl: &RecordNode) -> Option<Table> {
    let dims = ctrl
        .children
        .iter()
        .find(|c| c.tag_id == HWPTAG_TABLE)
        .and_then(|c| parse_table_dimensions(&c.payload))?;
    let (row_count, _col_count) = dims;

    let mut rows: Vec<TableRow> = (0..row_count).map(|_| TableRow::new(Vec::new())).collect();

    for child in ctrl.children.iter().filter(|c| c.tag_id == HWPTAG_LIST_HEADER) {
        let (row_addr, colspan, rowspan) = parse_cell_header(&child.payload);

        let mut content: Vec<Paragraph> = Vec::new();
        let mut cell_blocks = Vec::new();
        for para in child.children.iter().filter(|c| c.tag_id == HWPTAG_PARA_HEADER) {
            interpret_paragraph(para, &mut cell_blocks);
        }
        for block in cell_blocks {
            match block {
                Block::Paragraph(p) => content.push(p),
                // nested tables are flattened to their text content
                Block::Table(t) => content.push(Paragraph::with_text(t.plain_text())),
                Block::Opaque { .. } => {}
            }
        }

        let cell = TableCell::with_content(content)
            .colspan(colspan)
            .rowspan(rowspan);

        match rows.get_mut(row_addr as usize) {
            Some(row) => row.cells.push(cell),
            None => log::debug!("table cell addresses row {row_addr} outside the declared grid"),
        }
    }

    Some(Table {
        rows,
        header_rows: 0,
        caption: None,
    })
}

/// (row count, column count) from a TABLE record payload.
fn parse_table_dimensions(payload: &[u8]) -> Option<(u16, u16)> {
    if payload.len() < 8 {
        return None;
    }
    let rows = u16::from_le_bytes([payload[4], payload[5]]);
    let cols = u16::from_le_bytes([payload[6], payload[7]]);
    if rows == 0 {
        return None;
    }
    Some((rows, cols))
}

/// (row address, colspan, rowspan) from a cell LIST_HEADER payload.
///
/// The list header proper is 8 bytes; cell placement follows as u16 column
/// address, row address, column span, row span.
fn parse_cell_header(payload: &[u8]) -> (u16, u16, u16) {
    if payload.len() < 16 {
        return (0, 1, 1);
    }
    let row_addr = u16::from_le_bytes([payload[10], payload[11]]);
    let colspan = u16::from_le_bytes([payload[12], payload[13]]).max(1);
    let rowspan = u16::from_le_bytes([payload[14], payload[15]]).max(1);
    (row_addr, colspan, rowspan)
}

/// True for control codes followed by 7 extra code units of inline data.
fn is_inline_control(code: u16) -> bool {
    matches!(code, 4..=9 | 19 | 20)
}

/// True for control codes that anchor an extended control object and carry
/// 7 extra code units of reference data.
fn is_extended_control(code: u16) -> bool {
    matches!(code, 1..=3 | 11 | 12 | 14..=18 | 21..=23)
}

/// Decode a PARA_TEXT payload into inline content.
///
/// Text is UTF-16LE. Code units below 32 are control characters: char
/// controls occupy one unit, inline and extended controls occupy eight.
/// Character-shape run boundaries from PARA_CHAR_SHAPE split the decoded
/// text into runs; positions count code units, controls included.
fn decode_para_text(payload: &[u8], shape_runs: &[(u32, u32)]) -> Vec<InlineContent> {
    fn flush(buffer: &mut Vec<u16>, shape: Option<u32>, content: &mut Vec<InlineContent>) {
        if buffer.is_empty() {
            return;
        }
        let text = String::from_utf16_lossy(buffer);
        buffer.clear();
        let run = match shape {
            Some(id) => TextRun::with_shape(text, id),
            None => TextRun::new(text),
        };
        content.push(InlineContent::Text(run));
    }

    let mut content: Vec<InlineContent> = Vec::new();
    let mut buffer: Vec<u16> = Vec::new();
    let mut position: u32 = 0;
    let mut run_index = 0usize;
    let mut current_shape: Option<u32> = shape_runs.first().map(|&(_, id)| id);

    let mut units = payload
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]));

    while let Some(code) = units.next() {
        // advance the active shape run at its boundary
        while run_index + 1 < shape_runs.len() && shape_runs[run_index + 1].0 <= position {
            run_index += 1;
            let next_shape = Some(shape_runs[run_index].1);
            if next_shape != current_shape {
                flush(&mut buffer, current_shape, &mut content);
                current_shape = next_shape;
            }
        }

        if code >= 32 {
            buffer.push(code);
            position += 1;
            continue;
        }

        if is_extended_control(code) || is_inline_control(code) {
            if code == 9 {
                flush(&mut buffer, current_shape, &mut content);
                content.push(InlineContent::Tab);
            }
            // consume the control's 7 data units
            for _ in 0..7 {
                units.next();
            }
            position += 8;
            continue;
        }

        match code {
            10 => {
                flush(&mut buffer, current_shape, &mut content);
                content.push(InlineContent::LineBreak);
            }
            13 => {} // paragraph mark, boundary already explicit in records
            24 => buffer.push(u16::from(b'-')),
            30 => buffer.push(0x00A0),
            31 => buffer.push(u16::from(b' ')),
            _ => {}
        }
        position += 1;
    }

    flush(&mut buffer, current_shape, &mut content);
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::tests::encode_record;

    /// Encode UTF-16LE text for a PARA_TEXT payload.
    fn utf16_payload(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    /// Encode (position, shape id) pairs for a PARA_CHAR_SHAPE payload.
    fn shape_run_payload(runs: &[(u32, u32)]) -> Vec<u8> {
        runs.iter()
            .flat_map(|&(pos, id)| {
                pos.to_le_bytes().into_iter().chain(id.to_le_bytes())
            })
            .collect()
    }

    fn para_header_payload(para_shape_id: u16) -> Vec<u8> {
        let mut payload = vec![0u8; 22];
        payload[8..10].copy_from_slice(&para_shape_id.to_le_bytes());
        payload
    }

    #[test]
    fn test_level_gap_rejected() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &[0u8; 8]);
        data.extend(encode_record(HWPTAG_PARA_TEXT, 2, &[0u8; 4]));

        let err = build_section(&data, "BodyText/Section0", 0).unwrap_err();
        match err {
            Error::MalformedLevelSequence {
                expected_max,
                found,
                offset,
                ..
            } => {
                assert_eq!(expected_max, 1);
                assert_eq!(found, 2);
                assert_eq!(offset, 12);
            }
            other => panic!("expected MalformedLevelSequence, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_stream_is_empty_section() {
        let section = build_section(&[], "BodyText/Section0", 0).unwrap();
        assert!(section.is_empty());
        assert_eq!(section.index, 0);
    }

    #[test]
    fn test_simple_paragraph() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(2));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 1, &utf16_payload("안녕하세요")));

        let section = build_section(&data, "BodyText/Section0", 0).unwrap();
        assert_eq!(section.block_count(), 1);
        match &section.blocks[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.plain_text(), "안녕하세요");
                assert_eq!(p.style.para_shape_id, Some(2));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_runs_split_text() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(0));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 1, &utf16_payload("plainbold")));
        data.extend(encode_record(
            HWPTAG_PARA_CHAR_SHAPE,
            1,
            &shape_run_payload(&[(0, 0), (5, 1)]),
        ));

        let section = build_section(&data, "test", 0).unwrap();
        let Block::Paragraph(p) = &section.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.content.len(), 2);
        match (&p.content[0], &p.content[1]) {
            (InlineContent::Text(a), InlineContent::Text(b)) => {
                assert_eq!(a.text, "plain");
                assert_eq!(a.char_shape_id, Some(0));
                assert_eq!(b.text, "bold");
                assert_eq!(b.char_shape_id, Some(1));
            }
            other => panic!("expected two runs, got {other:?}"),
        }
    }

    #[test]
    fn test_control_characters() {
        // "a" TAB(inline, 8 units) "b" LINEBREAK "c" NBSP(char) "d"
        let mut units: Vec<u16> = vec![u16::from(b'a')];
        units.push(9);
        units.extend([0u16; 7]);
        units.push(u16::from(b'b'));
        units.push(10);
        units.push(u16::from(b'c'));
        units.push(30);
        units.push(u16::from(b'd'));
        let payload: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();

        let content = decode_para_text(&payload, &[]);
        assert_eq!(
            content,
            vec![
                InlineContent::Text(TextRun::new("a")),
                InlineContent::Tab,
                InlineContent::Text(TextRun::new("b")),
                InlineContent::LineBreak,
                InlineContent::Text(TextRun::new("c\u{00A0}d")),
            ]
        );
    }

    #[test]
    fn test_extended_control_skipped() {
        // extended control 11 (anchored object) carries 7 data units that
        // must not leak into the text
        let mut units: Vec<u16> = vec![11];
        units.extend([0x4141u16; 7]);
        units.push(u16::from(b'x'));
        let payload: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();

        let content = decode_para_text(&payload, &[]);
        assert_eq!(content, vec![InlineContent::Text(TextRun::new("x"))]);
    }

    #[test]
    fn test_unknown_tag_preserved_as_opaque() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(0));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 1, &utf16_payload("known")));
        data.extend(encode_record(500, 1, &[0xCA, 0xFE]));
        data.extend(encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(0)));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 1, &utf16_payload("sibling")));

        let section = build_section(&data, "test", 0).unwrap();
        assert_eq!(section.block_count(), 3);
        assert!(section.blocks[0].is_paragraph());
        match &section.blocks[1] {
            Block::Opaque { tag_id, data } => {
                assert_eq!(*tag_id, 500);
                assert_eq!(data, &[0xCA, 0xFE]);
            }
            other => panic!("expected opaque, got {other:?}"),
        }
        // the unknown record does not break traversal of known siblings
        match &section.blocks[2] {
            Block::Paragraph(p) => assert_eq!(p.plain_text(), "sibling"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_table() {
        // paragraph anchoring a 1x2 table: ctrl header -> table dims +
        // two cell list headers, each holding one paragraph
        let mut table_payload = vec![0u8; 26];
        table_payload[4..6].copy_from_slice(&1u16.to_le_bytes()); // rows
        table_payload[6..8].copy_from_slice(&2u16.to_le_bytes()); // cols

        let cell_header = |col: u16, row: u16| {
            let mut p = vec![0u8; 30];
            p[8..10].copy_from_slice(&col.to_le_bytes());
            p[10..12].copy_from_slice(&row.to_le_bytes());
            p[12..14].copy_from_slice(&1u16.to_le_bytes());
            p[14..16].copy_from_slice(&1u16.to_le_bytes());
            p
        };

        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(0));
        data.extend(encode_record(
            HWPTAG_CTRL_HEADER,
            1,
            &CTRL_TABLE.to_le_bytes(),
        ));
        data.extend(encode_record(HWPTAG_TABLE, 2, &table_payload));
        data.extend(encode_record(HWPTAG_LIST_HEADER, 2, &cell_header(0, 0)));
        data.extend(encode_record(HWPTAG_PARA_HEADER, 3, &para_header_payload(0)));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 4, &utf16_payload("셀1")));
        data.extend(encode_record(HWPTAG_LIST_HEADER, 2, &cell_header(1, 0)));
        data.extend(encode_record(HWPTAG_PARA_HEADER, 3, &para_header_payload(0)));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 4, &utf16_payload("셀2")));

        let section = build_section(&data, "test", 0).unwrap();
        assert_eq!(section.block_count(), 2);
        assert!(section.blocks[0].is_paragraph());
        match &section.blocks[1] {
            Block::Table(table) => {
                assert_eq!(table.row_count(), 1);
                assert_eq!(table.column_count(), 2);
                assert_eq!(table.rows[0].cells[0].plain_text(), "셀1");
                assert_eq!(table.rows[0].cells[1].plain_text(), "셀2");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_non_table_control_preserved() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(0));
        data.extend(encode_record(
            HWPTAG_CTRL_HEADER,
            1,
            &u32::from_be_bytes(*b"secd").to_le_bytes(),
        ));

        let section = build_section(&data, "test", 0).unwrap();
        assert_eq!(section.block_count(), 2);
        assert!(section.blocks[1].is_opaque());
    }

    #[test]
    fn test_build_idempotent() {
        let mut data = encode_record(HWPTAG_PARA_HEADER, 0, &para_header_payload(1));
        data.extend(encode_record(HWPTAG_PARA_TEXT, 1, &utf16_payload("반복 빌드")));

        let first = build_section(&data, "test", 0).unwrap();
        let second = build_section(&data, "test", 0).unwrap();
        assert_eq!(first.blocks, second.blocks);
    }
}
