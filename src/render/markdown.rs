//! Markdown rendering for HWP documents.

use crate::error::Result;
use crate::model::{
    Alignment, Block, Document, InlineContent, ListInfo, ListStyle, NumberStyle, Paragraph,
    Section, Table, TextRun, TextStyle,
};

use super::{RenderOptions, TableFallback};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
        }

        for section in &doc.sections {
            self.render_section(&mut output, section);
        }

        Ok(output.trim().to_string())
    }

    fn render_section(&self, output: &mut String, section: &Section) {
        for block in &section.blocks {
            self.render_block(output, block);
        }
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Paragraph(p) => self.render_paragraph(output, p),
            Block::Table(t) => self.render_table(output, t),
            // uninterpreted records carry no renderable text
            Block::Opaque { .. } => {}
        }
    }

    fn render_paragraph(&self, output: &mut String, para: &Paragraph) {
        if para.is_empty() {
            return;
        }

        if let Some(level) = para.style.heading_level {
            let level = level.min(self.options.max_heading_level);
            let prefix = "#".repeat(level as usize);
            output.push_str(&prefix);
            output.push(' ');
            self.render_inline_content(output, &para.content);
            output.push_str("\n\n");
            return;
        }

        if let Some(ref list_info) = para.style.list_info {
            self.render_list_item(output, para, list_info);
            return;
        }

        self.render_inline_content(output, &para.content);
        output.push_str("\n\n");
    }

    fn render_list_item(&self, output: &mut String, para: &Paragraph, list_info: &ListInfo) {
        let indent = "  ".repeat(list_info.level as usize);

        let marker = match &list_info.style {
            ListStyle::Unordered { marker: _ } => {
                format!("{}", self.options.list_marker)
            }
            ListStyle::Ordered { number_style, .. } => {
                let num = list_info.item_number.unwrap_or(1);
                match number_style {
                    NumberStyle::Decimal => format!("{num}."),
                    NumberStyle::LowerAlpha => {
                        format!("{}.", char::from_u32('a' as u32 + num - 1).unwrap_or('a'))
                    }
                    NumberStyle::UpperAlpha => {
                        format!("{}.", char::from_u32('A' as u32 + num - 1).unwrap_or('A'))
                    }
                    NumberStyle::LowerRoman => format!("{}.", to_roman(num).to_lowercase()),
                    NumberStyle::UpperRoman => format!("{}.", to_roman(num)),
                }
            }
        };

        output.push_str(&indent);
        output.push_str(&marker);
        output.push(' ');
        self.render_inline_content(output, &para.content);
        output.push('\n');
    }

    fn render_inline_content(&self, output: &mut String, content: &[InlineContent]) {
        for item in content {
            match item {
                InlineContent::Text(run) => {
                    self.render_text_run(output, run);
                }
                InlineContent::LineBreak => {
                    if self.options.preserve_line_breaks {
                        output.push_str("  \n");
                    } else {
                        output.push(' ');
                    }
                }
                InlineContent::Tab => output.push(' '),
            }
        }
    }

    fn render_text_run(&self, output: &mut String, run: &TextRun) {
        let text = if self.options.escape_special_chars {
            escape_markdown(&run.text)
        } else {
            run.text.clone()
        };

        let styled = apply_text_style(&text, &run.style);
        output.push_str(&styled);
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.is_empty() {
            return;
        }

        if table.has_merged_cells() && self.options.table_fallback == TableFallback::Html {
            self.render_table_html(output, table);
            return;
        }

        self.render_table_markdown(output, table);
    }

    fn render_table_markdown(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for cell in &row.cells {
                let content = cell.plain_text().replace('\n', " ");
                output.push_str(&format!(" {} |", content.trim()));
            }
            output.push('\n');

            // separator after the first row; pipe tables need a header
            if i == 0 {
                output.push('|');
                for cell in &row.cells {
                    let align_marker = match cell.alignment {
                        Alignment::Center => " :---: |",
                        Alignment::Right => " ---: |",
                        Alignment::Left | Alignment::Justify => " --- |",
                    };
                    output.push_str(align_marker);
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn render_table_html(&self, output: &mut String, table: &Table) {
        output.push_str("<table>\n");
        output.push_str("<tbody>\n");
        for row in &table.rows {
            self.render_html_row(output, row);
        }
        output.push_str("</tbody>\n");
        output.push_str("</table>\n\n");
    }

    fn render_html_row(&self, output: &mut String, row: &crate::model::TableRow) {
        output.push_str("<tr>");

        for cell in &row.cells {
            let mut attrs = String::new();
            if cell.rowspan > 1 {
                attrs.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
            }
            if cell.colspan > 1 {
                attrs.push_str(&format!(" colspan=\"{}\"", cell.colspan));
            }

            let content = cell.plain_text();
            output.push_str(&format!("<td{attrs}>"));
            output.push_str(&content);
            output.push_str("</td>");
        }

        output.push_str("</tr>\n");
    }
}

/// Wrap text in Markdown/HTML style markers, innermost first.
fn apply_text_style(text: &str, style: &TextStyle) -> String {
    let mut result = text.to_string();

    if style.strikethrough {
        result = format!("~~{result}~~");
    }
    if style.italic {
        result = format!("*{result}*");
    }
    if style.bold {
        result = format!("**{result}**");
    }
    if style.superscript {
        result = format!("<sup>{result}</sup>");
    }
    if style.subscript {
        result = format!("<sub>{result}</sub>");
    }
    if style.underline {
        result = format!("<u>{result}</u>");
    }

    result
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
/// We minimize escaping to improve readability of extracted text.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Convert number to Roman numerals.
fn to_roman(mut num: u32) -> String {
    let numerals = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut result = String::new();
    for (value, symbol) in numerals {
        while num >= value {
            result.push_str(symbol);
            num -= value;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TableRow};

    fn doc_with_blocks(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new();
        let mut section = Section::new(0);
        section.blocks = blocks;
        doc.add_section(section);
        doc
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("a|b"), "a\\|b");
        assert_eq!(escape_markdown("안녕하세요"), "안녕하세요");
    }

    #[test]
    fn test_apply_text_style() {
        let bold = TextStyle {
            bold: true,
            ..Default::default()
        };
        assert_eq!(apply_text_style("x", &bold), "**x**");

        let both = TextStyle {
            bold: true,
            italic: true,
            ..Default::default()
        };
        assert_eq!(apply_text_style("x", &both), "***x***");
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(1987), "MCMLXXXVII");
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        let doc = doc_with_blocks(vec![
            Block::Paragraph(Paragraph::heading("제목", 1)),
            Block::Paragraph(Paragraph::with_text("본문 내용")),
        ]);

        let md = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(md, "# 제목\n\n본문 내용");
    }

    #[test]
    fn test_render_heading_level_capped() {
        let doc = doc_with_blocks(vec![Block::Paragraph(Paragraph::heading("deep", 5))]);
        let options = RenderOptions::new().with_max_heading(3);
        let md = to_markdown(&doc, &options).unwrap();
        assert!(md.starts_with("### "));
    }

    #[test]
    fn test_render_table() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["이름", "나이"]));
        table.add_row(TableRow::from_strings(["Kim", "30"]));
        let doc = doc_with_blocks(vec![Block::Table(table)]);

        let md = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert!(md.contains("| 이름 | 나이 |"));
        assert!(md.contains("| --- | --- |"));
        assert!(md.contains("| Kim | 30 |"));
    }

    #[test]
    fn test_render_merged_table_html_fallback() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("span").colspan(2)]));
        table.add_row(TableRow::new(vec![
            TableCell::text("a"),
            TableCell::text("b"),
        ]));
        let doc = doc_with_blocks(vec![Block::Table(table)]);

        let options = RenderOptions::new().with_table_fallback(TableFallback::Html);
        let md = to_markdown(&doc, &options).unwrap();
        assert!(md.contains("<table>"));
        assert!(md.contains("colspan=\"2\""));
    }

    #[test]
    fn test_opaque_blocks_skipped() {
        let doc = doc_with_blocks(vec![
            Block::Opaque {
                tag_id: 99,
                data: vec![1, 2, 3],
            },
            Block::Paragraph(Paragraph::with_text("text")),
        ]);

        let md = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(md, "text");
    }

    #[test]
    fn test_line_break_modes() {
        let mut p = Paragraph::with_text("first");
        p.add_line_break();
        p.add_text("second");
        let doc = doc_with_blocks(vec![Block::Paragraph(p)]);

        let collapsed = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(collapsed, "first second");

        let preserved =
            to_markdown(&doc, &RenderOptions::new().with_line_breaks(true)).unwrap();
        assert_eq!(preserved, "first  \nsecond");
    }

    #[test]
    fn test_frontmatter() {
        let mut doc = doc_with_blocks(vec![Block::Paragraph(Paragraph::with_text("body"))]);
        doc.metadata.title = Some("문서".to_string());

        let options = RenderOptions::new().with_frontmatter(true);
        let md = to_markdown(&doc, &options).unwrap();
        assert!(md.starts_with("---"));
        assert!(md.contains("title: \"문서\""));
    }

    #[test]
    fn test_list_rendering() {
        let mut bullet = Paragraph::with_text("항목");
        bullet.style.list_info = Some(crate::model::ListInfo::bullet(0));
        let mut numbered = Paragraph::with_text("둘째");
        numbered.style.list_info = Some(crate::model::ListInfo::numbered(0, 2));
        let doc = doc_with_blocks(vec![
            Block::Paragraph(bullet),
            Block::Paragraph(numbered),
        ]);

        let md = to_markdown(&doc, &RenderOptions::default()).unwrap();
        assert!(md.contains("- 항목"));
        assert!(md.contains("2. 둘째"));
    }
}
