use super::DocxError;
use super::xml::{XmlElement, XmlNode, parse_xml, write_xml};

/// pPr children that must follow `w:jc` in schema order
const PPR_AFTER_JC: &[&str] = &[
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// rPr children that precede `w:b` in schema order
const RPR_BEFORE_B: &[&str] = &["w:rStyle", "w:rFonts"];

/// Paragraph alignment (`w:jc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn as_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    fn from_val(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Content of a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Tab,
    Break,
    /// Anything else (drawings, field codes, page breaks) kept verbatim
    Other(XmlNode),
}

/// A run of uniformly formatted text (`w:r`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub attrs: Vec<(String, String)>,
    pub props: Option<XmlElement>,
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn new(text: &str) -> Self {
        let mut run = Run::default();
        run.set_text(text);
        run
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Tab => out.push('\t'),
                RunContent::Break => out.push('\n'),
                RunContent::Other(XmlNode::Element(e)) if e.is("w:noBreakHyphen") => out.push('-'),
                RunContent::Other(_) => {}
            }
        }
        out
    }

    /// Remove all content, keeping run properties
    pub fn clear(&mut self) {
        self.content.clear();
    }

    /// Replace the run's content with `text`; tabs and newlines become
    /// `w:tab` and `w:br` elements
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        let mut pending = String::new();
        for c in text.chars() {
            match c {
                '\t' | '\n' | '\r' => {
                    if !pending.is_empty() {
                        self.content.push(RunContent::Text(std::mem::take(&mut pending)));
                    }
                    self.content.push(if c == '\t' {
                        RunContent::Tab
                    } else {
                        RunContent::Break
                    });
                }
                _ => pending.push(c),
            }
        }
        if !pending.is_empty() {
            self.content.push(RunContent::Text(pending));
        }
    }

    pub fn is_bold(&self) -> bool {
        self.props
            .as_ref()
            .and_then(|p| p.find_child("w:b"))
            .is_some_and(|b| !matches!(b.attr("w:val").as_deref(), Some("0" | "false" | "off")))
    }

    pub fn set_bold(&mut self, bold: bool) {
        let props = self.props.get_or_insert_with(|| XmlElement::new("w:rPr"));
        props
            .children
            .retain(|c| !matches!(c, XmlNode::Element(e) if e.is("w:b")));
        if bold {
            let at = props
                .children
                .iter()
                .rposition(|c| matches!(c, XmlNode::Element(e) if RPR_BEFORE_B.contains(&e.name.as_str())))
                .map(|i| i + 1)
                .unwrap_or(0);
            props.children.insert(at, XmlNode::Element(XmlElement::new("w:b")));
        }
    }

    fn from_element(el: XmlElement) -> Self {
        let mut run = Run {
            attrs: el.attrs,
            ..Default::default()
        };
        for child in el.children {
            match child {
                XmlNode::Element(e) if e.is("w:rPr") => run.props = Some(e),
                XmlNode::Element(e) if e.is("w:t") => run.content.push(RunContent::Text(e.text_content())),
                XmlNode::Element(e) if e.is("w:tab") => run.content.push(RunContent::Tab),
                XmlNode::Element(e) if e.is("w:cr") => run.content.push(RunContent::Break),
                XmlNode::Element(e)
                    if e.is("w:br")
                        && matches!(e.attr("w:type").as_deref(), None | Some("textWrapping")) =>
                {
                    run.content.push(RunContent::Break)
                }
                other => run.content.push(RunContent::Other(other)),
            }
        }
        run
    }

    fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:r");
        el.attrs = self.attrs.clone();
        if let Some(props) = &self.props {
            el.children.push(XmlNode::Element(props.clone()));
        }
        for item in &self.content {
            let node = match item {
                RunContent::Text(t) => {
                    let mut te = XmlElement::new("w:t").with_text(t);
                    if t.starts_with(char::is_whitespace) || t.ends_with(char::is_whitespace) {
                        te.set_attr("xml:space", "preserve");
                    }
                    XmlNode::Element(te)
                }
                RunContent::Tab => XmlNode::Element(XmlElement::new("w:tab")),
                RunContent::Break => XmlNode::Element(XmlElement::new("w:br")),
                RunContent::Other(node) => node.clone(),
            };
            el.children.push(node);
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphItem {
    Run(Run),
    /// Hyperlinks, bookmarks, proofing marks and the like
    Other(XmlNode),
}

/// A paragraph (`w:p`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub attrs: Vec<(String, String)>,
    pub props: Option<XmlElement>,
    pub items: Vec<ParagraphItem>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.items.iter().filter_map(|i| match i {
            ParagraphItem::Run(r) => Some(r),
            _ => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.items.iter_mut().filter_map(|i| match i {
            ParagraphItem::Run(r) => Some(r),
            _ => None,
        })
    }

    /// Text of the paragraph's direct runs
    pub fn text(&self) -> String {
        self.runs().map(|r| r.text()).collect()
    }

    pub fn add_run(&mut self, run: Run) {
        self.items.push(ParagraphItem::Run(run));
    }

    /// Collapse the paragraph's runs into a single run holding `text`.
    ///
    /// Every run is cleared; the first run (keeping its run properties)
    /// receives the text. A run is appended when the paragraph has none.
    pub fn replace_text(&mut self, text: &str) {
        let mut written = false;
        for run in self.runs_mut() {
            if written {
                run.clear();
            } else {
                run.set_text(text);
                written = true;
            }
        }
        if !written {
            self.add_run(Run::new(text));
        }
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.props
            .as_ref()
            .and_then(|p| p.find_child("w:jc"))
            .and_then(|jc| jc.attr("w:val"))
            .and_then(|v| Alignment::from_val(&v))
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        let props = self.props.get_or_insert_with(|| XmlElement::new("w:pPr"));
        if let Some(jc) = props.find_child_mut("w:jc") {
            jc.set_attr("w:val", alignment.as_val());
            return;
        }
        let jc = XmlElement::new("w:jc").with_attr("w:val", alignment.as_val());
        let at = props
            .children
            .iter()
            .position(|c| matches!(c, XmlNode::Element(e) if PPR_AFTER_JC.contains(&e.name.as_str())))
            .unwrap_or(props.children.len());
        props.children.insert(at, XmlNode::Element(jc));
    }

    fn from_element(el: XmlElement) -> Self {
        let mut para = Paragraph {
            attrs: el.attrs,
            ..Default::default()
        };
        for child in el.children {
            match child {
                XmlNode::Element(e) if e.is("w:pPr") => para.props = Some(e),
                XmlNode::Element(e) if e.is("w:r") => para.items.push(ParagraphItem::Run(Run::from_element(e))),
                other => para.items.push(ParagraphItem::Other(other)),
            }
        }
        para
    }

    fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:p");
        el.attrs = self.attrs.clone();
        if let Some(props) = &self.props {
            el.children.push(XmlNode::Element(props.clone()));
        }
        for item in &self.items {
            el.children.push(match item {
                ParagraphItem::Run(r) => XmlNode::Element(r.to_element()),
                ParagraphItem::Other(node) => node.clone(),
            });
        }
        el
    }
}

/// Block-level content of the body or of a table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Other(XmlNode),
}

impl Block {
    fn from_node(node: XmlNode) -> Self {
        match node {
            XmlNode::Element(e) if e.is("w:p") => Block::Paragraph(Paragraph::from_element(e)),
            XmlNode::Element(e) if e.is("w:tbl") => Block::Table(Table::from_element(e)),
            other => Block::Other(other),
        }
    }

    fn to_node(&self) -> XmlNode {
        match self {
            Block::Paragraph(p) => XmlNode::Element(p.to_element()),
            Block::Table(t) => XmlNode::Element(t.to_element()),
            Block::Other(node) => node.clone(),
        }
    }
}

fn paragraphs_of(blocks: &[Block]) -> impl Iterator<Item = &Paragraph> {
    blocks.iter().filter_map(|b| match b {
        Block::Paragraph(p) => Some(p),
        _ => None,
    })
}

fn paragraphs_of_mut(blocks: &mut [Block]) -> impl Iterator<Item = &mut Paragraph> {
    blocks.iter_mut().filter_map(|b| match b {
        Block::Paragraph(p) => Some(p),
        _ => None,
    })
}

/// A table cell (`w:tc`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub attrs: Vec<(String, String)>,
    pub props: Option<XmlElement>,
    pub blocks: Vec<Block>,
}

impl Cell {
    /// Empty cell of the given width in twentieths of a point
    pub fn with_width(width: Option<&str>) -> Self {
        let props = width.map(|w| {
            XmlElement::new("w:tcPr").with_child(
                XmlElement::new("w:tcW")
                    .with_attr("w:w", w)
                    .with_attr("w:type", "dxa"),
            )
        });
        Cell {
            attrs: Vec::new(),
            props,
            // A cell must contain at least one paragraph
            blocks: vec![Block::Paragraph(Paragraph::new())],
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        paragraphs_of(&self.blocks)
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        paragraphs_of_mut(&mut self.blocks)
    }

    /// Paragraph texts joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace all cell content with one aligned paragraph holding `text`
    pub fn write(&mut self, text: &str, alignment: Alignment, bold: bool) {
        let mut para = Paragraph::new();
        para.set_alignment(alignment);
        let mut run = Run::new(text);
        if bold {
            run.set_bold(true);
        }
        para.add_run(run);
        self.blocks = vec![Block::Paragraph(para)];
    }

    fn from_element(el: XmlElement) -> Self {
        let mut cell = Cell {
            attrs: el.attrs,
            ..Default::default()
        };
        for child in el.children {
            match child {
                XmlNode::Element(e) if e.is("w:tcPr") => cell.props = Some(e),
                other => cell.blocks.push(Block::from_node(other)),
            }
        }
        cell
    }

    fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tc");
        el.attrs = self.attrs.clone();
        if let Some(props) = &self.props {
            el.children.push(XmlNode::Element(props.clone()));
        }
        el.children.extend(self.blocks.iter().map(Block::to_node));
        el
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowItem {
    Cell(Cell),
    /// Row properties and anything else that is not a cell
    Other(XmlNode),
}

/// A table row (`w:tr`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub attrs: Vec<(String, String)>,
    pub items: Vec<RowItem>,
}

impl Row {
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Row {
            attrs: Vec::new(),
            items: cells.into_iter().map(RowItem::Cell).collect(),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.items.iter().filter_map(|i| match i {
            RowItem::Cell(c) => Some(c),
            _ => None,
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.items.iter_mut().filter_map(|i| match i {
            RowItem::Cell(c) => Some(c),
            _ => None,
        })
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells().nth(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells_mut().nth(index)
    }

    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    fn from_element(el: XmlElement) -> Self {
        Row {
            attrs: el.attrs,
            items: el
                .children
                .into_iter()
                .map(|child| match child {
                    XmlNode::Element(e) if e.is("w:tc") => RowItem::Cell(Cell::from_element(e)),
                    other => RowItem::Other(other),
                })
                .collect(),
        }
    }

    fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tr");
        el.attrs = self.attrs.clone();
        for item in &self.items {
            el.children.push(match item {
                RowItem::Cell(c) => XmlNode::Element(c.to_element()),
                RowItem::Other(node) => node.clone(),
            });
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableItem {
    Row(Row),
    /// Table properties, grid, and non-row content
    Other(XmlNode),
}

/// A table (`w:tbl`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub attrs: Vec<(String, String)>,
    pub items: Vec<TableItem>,
}

impl Table {
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.items.iter().filter_map(|i| match i {
            TableItem::Row(r) => Some(r),
            _ => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.items.iter_mut().filter_map(|i| match i {
            TableItem::Row(r) => Some(r),
            _ => None,
        })
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows().nth(index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows_mut().nth(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Column widths from `w:tblGrid`, in document order
    pub fn grid_widths(&self) -> Vec<Option<String>> {
        self.items
            .iter()
            .find_map(|i| match i {
                TableItem::Other(XmlNode::Element(e)) if e.is("w:tblGrid") => Some(e),
                _ => None,
            })
            .map(|grid| {
                grid.child_elements()
                    .filter(|c| c.is("w:gridCol"))
                    .map(|c| c.attr("w:w"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A blank row shaped by the table grid, or by the first row when the
    /// table carries no grid
    pub fn blank_row(&self) -> Row {
        let widths = self.grid_widths();
        let cells = if widths.is_empty() {
            let count = self.row(0).map(|r| r.cell_count()).unwrap_or(0);
            (0..count).map(|_| Cell::with_width(None)).collect()
        } else {
            widths.iter().map(|w| Cell::with_width(w.as_deref())).collect()
        };
        Row::from_cells(cells)
    }

    /// Append a blank row and return its index
    pub fn add_row(&mut self) -> usize {
        let row = self.blank_row();
        self.items.push(TableItem::Row(row));
        self.row_count() - 1
    }

    /// Insert `row` so that it ends up at row index `index`; indexes past the
    /// end append
    pub fn insert_row(&mut self, index: usize, row: Row) {
        match self.item_index(index) {
            Some(at) => self.items.insert(at, TableItem::Row(row)),
            None => self.items.push(TableItem::Row(row)),
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        let at = self.item_index(index)?;
        match self.items.remove(at) {
            TableItem::Row(r) => Some(r),
            TableItem::Other(_) => None,
        }
    }

    fn item_index(&self, row_index: usize) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| matches!(i, TableItem::Row(_)))
            .nth(row_index)
            .map(|(at, _)| at)
    }

    fn from_element(el: XmlElement) -> Self {
        Table {
            attrs: el.attrs,
            items: el
                .children
                .into_iter()
                .map(|child| match child {
                    XmlNode::Element(e) if e.is("w:tr") => TableItem::Row(Row::from_element(e)),
                    other => TableItem::Other(other),
                })
                .collect(),
        }
    }

    fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tbl");
        el.attrs = self.attrs.clone();
        for item in &self.items {
            el.children.push(match item {
                TableItem::Row(r) => XmlNode::Element(r.to_element()),
                TableItem::Other(node) => node.clone(),
            });
        }
        el
    }
}

/// The main document part (`w:document`) as body blocks plus the
/// surrounding XML shell
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: XmlElement,
    body_index: usize,
    body_attrs: Vec<(String, String)>,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn from_xml(xml: &str) -> Result<Self, DocxError> {
        let mut root = parse_xml(xml)?;
        let body_index = root
            .children
            .iter()
            .position(|c| matches!(c, XmlNode::Element(e) if e.is("w:body")))
            .ok_or(DocxError::MissingBody)?;

        let body = match root.children.remove(body_index) {
            XmlNode::Element(e) => e,
            _ => return Err(DocxError::MissingBody),
        };

        Ok(Self {
            root,
            body_index,
            body_attrs: body.attrs,
            blocks: body.children.into_iter().map(Block::from_node).collect(),
        })
    }

    pub fn to_xml(&self) -> String {
        let mut body = XmlElement::new("w:body");
        body.attrs = self.body_attrs.clone();
        body.children = self.blocks.iter().map(Block::to_node).collect();

        let mut root = self.root.clone();
        root.children.insert(self.body_index, XmlNode::Element(body));
        write_xml(&root)
    }

    /// Body-level paragraphs in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        paragraphs_of(&self.blocks)
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        paragraphs_of_mut(&mut self.blocks)
    }

    /// Body-level tables in document order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Client: {CLIENT </w:t></w:r><w:r><w:t>NAME}</w:t></w:r><w:r><w:tab/><w:t>x</w:t></w:r></w:p><w:tbl><w:tblPr/><w:tblGrid><w:gridCol w:w="3000"/><w:gridCol w:w="2000"/></w:tblGrid><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>Phase</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Estimate</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:sectPr/></w:body></w:document>"#;

    #[test]
    fn test_document_text_model() {
        let doc = Document::from_xml(DOC).unwrap();

        let paras: Vec<_> = doc.paragraphs().collect();
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text(), "Client: {CLIENT NAME}\tx");
        assert!(paras[0].runs().next().unwrap().is_bold());

        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row(0).unwrap().cell(1).unwrap().text(), "Estimate");
        assert_eq!(
            table.grid_widths(),
            vec![Some("3000".to_string()), Some("2000".to_string())]
        );
    }

    #[test]
    fn test_replace_text_collapses_runs() {
        let mut doc = Document::from_xml(DOC).unwrap();
        let para = doc.paragraphs_mut().next().unwrap();
        para.replace_text("Client: Acme Co");

        assert_eq!(para.text(), "Client: Acme Co");
        let runs: Vec<_> = para.runs().collect();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), "Client: Acme Co");
        assert!(runs[0].is_bold());
        assert!(runs[1].text().is_empty() && runs[2].text().is_empty());
    }

    #[test]
    fn test_replace_text_without_runs_appends() {
        let mut para = Paragraph::new();
        para.replace_text("hello");
        assert_eq!(para.runs().count(), 1);
        assert_eq!(para.text(), "hello");
    }

    #[test]
    fn test_run_text_with_controls() {
        let run = Run::new("a\tb\nc");
        assert_eq!(
            run.content,
            vec![
                RunContent::Text("a".into()),
                RunContent::Tab,
                RunContent::Text("b".into()),
                RunContent::Break,
                RunContent::Text("c".into()),
            ]
        );
        assert_eq!(run.text(), "a\tb\nc");
    }

    #[test]
    fn test_set_alignment_respects_schema_order() {
        let mut para = Paragraph::new();
        para.props = Some(
            XmlElement::new("w:pPr")
                .with_child(XmlElement::new("w:spacing"))
                .with_child(XmlElement::new("w:rPr")),
        );
        para.set_alignment(Alignment::Center);

        let names: Vec<_> = para
            .props
            .as_ref()
            .unwrap()
            .child_elements()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["w:spacing", "w:jc", "w:rPr"]);
        assert_eq!(para.alignment(), Some(Alignment::Center));

        para.set_alignment(Alignment::Right);
        assert_eq!(para.alignment(), Some(Alignment::Right));
    }

    #[test]
    fn test_cell_write() {
        let mut cell = Cell::with_width(Some("1200"));
        cell.write("Discovery", Alignment::Center, true);

        let paras: Vec<_> = cell.paragraphs().collect();
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].alignment(), Some(Alignment::Center));
        assert!(paras[0].runs().next().unwrap().is_bold());
        assert_eq!(cell.text(), "Discovery");
        assert!(cell.props.is_some());
    }

    #[test]
    fn test_table_row_operations() {
        let mut doc = Document::from_xml(DOC).unwrap();
        let table = doc.tables_mut().next().unwrap();

        let idx = table.add_row();
        assert_eq!(idx, 1);
        assert_eq!(table.row(1).unwrap().cell_count(), 2);

        let mut row = table.blank_row();
        row.cell_mut(0).unwrap().write("First", Alignment::Left, false);
        table.insert_row(1, row);
        assert_eq!(table.row(1).unwrap().cell(0).unwrap().text(), "First");
        assert_eq!(table.row_count(), 3);

        let removed = table.remove_row(0).unwrap();
        assert_eq!(removed.cell(0).unwrap().text(), "Phase");
        assert_eq!(table.row_count(), 2);
        assert!(table.remove_row(5).is_none());
    }

    #[test]
    fn test_document_roundtrip_keeps_shell() {
        let doc = Document::from_xml(DOC).unwrap();
        let again = Document::from_xml(&doc.to_xml()).unwrap();
        assert_eq!(doc, again);
        assert!(doc.to_xml().contains("<w:sectPr/>"));
    }

    #[test]
    fn test_missing_body() {
        let err = Document::from_xml("<w:document/>").unwrap_err();
        assert!(matches!(err, DocxError::MissingBody));
    }
}
