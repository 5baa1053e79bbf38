use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use tracing::{debug, trace};

use crate::config::ExtensionsConfig;
use crate::error::Result;
use crate::render::{Alignment, AutolinkType, ListType, Render};

pub fn parse_options(extensions: &ExtensionsConfig) -> Options {
    let mut options = Options::empty();
    if extensions.tables {
        options.insert(Options::ENABLE_TABLES);
    }
    if extensions.footnotes {
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if extensions.strikethrough {
        options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if extensions.superscript {
        options.insert(Options::ENABLE_SUPERSCRIPT);
    }
    options
}

/// Walk a markdown document and render it through `renderer`.
///
/// Children are always rendered before their parent, and every fragment is
/// appended to its parent's text in document order.
pub fn render<R: Render + ?Sized>(
    markdown: &str,
    extensions: &ExtensionsConfig,
    renderer: &R,
) -> Result<String> {
    let parser = Parser::new_ext(markdown, parse_options(extensions));
    let mut state = RenderState::new(markdown, extensions, renderer);

    for (event, range) in parser.into_offset_iter() {
        state.process_event(event, range)?;
    }

    Ok(state.finish())
}

enum Element {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    HtmlBlock,
    List(ListType),
    Item(ListType),
    FootnoteDefinition(String),
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emphasis { underline: bool },
    Strong,
    Strikethrough,
    Superscript,
    Link { dest: String, title: Option<String> },
    Autolink { dest: String, link_type: AutolinkType },
    Quote,
    Other,
}

impl Element {
    fn is_inline(&self) -> bool {
        matches!(
            self,
            Element::Emphasis { .. }
                | Element::Strong
                | Element::Strikethrough
                | Element::Superscript
                | Element::Link { .. }
                | Element::Autolink { .. }
                | Element::Quote
                | Element::Other
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Emphasis,
    Strong,
}

struct Frame {
    element: Element,
    text: String,
    pieces: usize,
    // Inner text of the only child so far, when that child is an emphasis or
    // strong span. `***x***` arrives as one nested inside the other.
    sole_span: Option<(SpanKind, String)>,
}

impl Frame {
    fn new(element: Element) -> Self {
        Self {
            element,
            text: String::new(),
            pieces: 0,
            sole_span: None,
        }
    }
}

struct TableState {
    alignments: Vec<Alignment>,
    header: String,
    column: usize,
}

struct ImageState {
    dest: String,
    title: Option<String>,
    alt: String,
    depth: usize,
}

struct RenderState<'a, R: Render + ?Sized> {
    source: &'a str,
    extensions: &'a ExtensionsConfig,
    renderer: &'a R,

    frames: Vec<Frame>,

    // Footnote labels are numbered in order of first reference
    footnote_numbers: HashMap<String, usize>,
    footnote_defs: Vec<(usize, String)>,

    table: Option<TableState>,
    image: Option<ImageState>,
}

impl<'a, R: Render + ?Sized> RenderState<'a, R> {
    fn new(source: &'a str, extensions: &'a ExtensionsConfig, renderer: &'a R) -> Self {
        Self {
            source,
            extensions,
            renderer,
            frames: vec![Frame::new(Element::Document)],
            footnote_numbers: HashMap::new(),
            footnote_defs: Vec::new(),
            table: None,
            image: None,
        }
    }

    fn top(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::new(Element::Document));
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn push(&mut self, fragment: String) {
        self.push_span(fragment, None);
    }

    fn push_span(&mut self, fragment: String, span: Option<(SpanKind, String)>) {
        if fragment.is_empty() {
            return;
        }
        let frame = self.top();
        frame.pieces += 1;
        frame.sole_span = if frame.pieces == 1 { span } else { None };
        frame.text.push_str(&fragment);
    }

    /// Append a block fragment, starting it on its own line when it follows
    /// inline text inside a list item.
    fn push_block(&mut self, fragment: String) {
        let frame = self.top();
        if matches!(frame.element, Element::Item(_))
            && !frame.text.is_empty()
            && !frame.text.ends_with('\n')
        {
            frame.text.push('\n');
        }
        self.push(fragment);
    }

    fn footnote_number(&mut self, label: &str) -> usize {
        let next = self.footnote_numbers.len() + 1;
        *self
            .footnote_numbers
            .entry(label.to_string())
            .or_insert(next)
    }

    /// Flatten quotes that were opened but never closed back into a literal
    /// quotation mark followed by their content.
    fn collapse_quotes(&mut self) {
        while matches!(self.top().element, Element::Quote) && self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                let literal = self.renderer.normal_text("\"");
                self.push(literal + &frame.text);
            }
        }
    }

    fn toggle_quote(&mut self) {
        if matches!(self.top().element, Element::Quote) && self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                let fragment = self.renderer.quote(&frame.text);
                self.push(fragment);
            }
        } else {
            self.frames.push(Frame::new(Element::Quote));
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) -> Result<()> {
        if self.image.is_some() {
            self.image_event(event);
            return Ok(());
        }

        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.end()?,

            Event::Text(text) => {
                if matches!(self.top().element, Element::CodeBlock(_)) {
                    self.top().text.push_str(&text);
                } else {
                    self.text(&text, range);
                }
            }

            Event::Code(code) => {
                let fragment = self.renderer.codespan(&code);
                self.push(fragment);
            }

            // Raw lines inside an HTML block; rendered when the block ends
            Event::Html(html) => self.top().text.push_str(&html),
            Event::InlineHtml(html) => {
                let fragment = self.renderer.raw_html(&html);
                self.push(fragment);
            }

            Event::FootnoteReference(label) => {
                let number = self.footnote_number(&label);
                let fragment = self.renderer.footnote_ref(number);
                self.push(fragment);
            }

            Event::SoftBreak => {
                let fragment = self.renderer.normal_text("\n");
                self.push(fragment);
            }
            Event::HardBreak => {
                let fragment = self.renderer.linebreak();
                self.push(fragment);
            }

            Event::Rule => {
                self.collapse_quotes();
                let fragment = self.renderer.hrule();
                self.push_block(fragment);
            }

            // Math is not enabled; treat it as text if it ever shows up
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                let fragment = self.renderer.normal_text(&math);
                self.push(fragment);
            }

            Event::TaskListMarker(_) => {}
        }

        Ok(())
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        let source = self.source.get(range).unwrap_or_default();
        if source.len() > 2 && source.starts_with('&') && source.ends_with(';') && source != text
        {
            let fragment = self.renderer.entity(text);
            self.push(fragment);
            return;
        }

        if !self.extensions.quote {
            let fragment = self.renderer.normal_text(text);
            self.push(fragment);
            return;
        }

        let mut rest = text;
        while let Some(pos) = rest.find('"') {
            let before = &rest[..pos];
            if !before.is_empty() {
                let fragment = self.renderer.normal_text(before);
                self.push(fragment);
            }
            self.toggle_quote();
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            let fragment = self.renderer.normal_text(rest);
            self.push(fragment);
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let element = match tag {
            Tag::Paragraph => Element::Paragraph,
            Tag::Heading { level, .. } => Element::Heading(heading_level_to_u8(level)),
            Tag::BlockQuote(_) => Element::BlockQuote,
            Tag::CodeBlock(kind) => Element::CodeBlock(match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.into_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            }),
            Tag::HtmlBlock => Element::HtmlBlock,
            Tag::List(first_item) => Element::List(if first_item.is_some() {
                ListType::Ordered
            } else {
                ListType::Unordered
            }),
            Tag::Item => {
                let list_type = match self.top().element {
                    Element::List(list_type) => list_type,
                    _ => ListType::Unordered,
                };
                Element::Item(list_type)
            }
            Tag::FootnoteDefinition(label) => Element::FootnoteDefinition(label.into_string()),

            Tag::Table(alignments) => {
                self.table = Some(TableState {
                    alignments: alignments.into_iter().map(Alignment::from).collect(),
                    header: String::new(),
                    column: 0,
                });
                Element::Table
            }
            Tag::TableHead => {
                self.reset_column();
                Element::TableHead
            }
            Tag::TableRow => {
                self.reset_column();
                Element::TableRow
            }
            Tag::TableCell => Element::TableCell,

            Tag::Emphasis => {
                // The event stream does not say which delimiter was used
                let underscore = self
                    .source
                    .get(range)
                    .is_some_and(|source| source.starts_with('_'));
                Element::Emphasis {
                    underline: self.extensions.underline && underscore,
                }
            }
            Tag::Strong => Element::Strong,
            Tag::Strikethrough => Element::Strikethrough,
            Tag::Superscript => Element::Superscript,

            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => match link_type {
                LinkType::Autolink => Element::Autolink {
                    dest: dest_url.into_string(),
                    link_type: AutolinkType::Url,
                },
                LinkType::Email => Element::Autolink {
                    dest: dest_url.into_string(),
                    link_type: AutolinkType::Email,
                },
                _ => Element::Link {
                    dest: dest_url.into_string(),
                    title: non_empty(title.into_string()),
                },
            },

            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageState {
                    dest: dest_url.into_string(),
                    title: non_empty(title.into_string()),
                    alt: String::new(),
                    depth: 0,
                });
                return;
            }

            other => {
                trace!(tag = ?other, "passing through unhandled tag");
                Element::Other
            }
        };

        if !element.is_inline() {
            self.collapse_quotes();
        }
        self.frames.push(Frame::new(element));
    }

    fn end(&mut self) -> Result<()> {
        self.collapse_quotes();
        if self.frames.len() <= 1 {
            return Ok(());
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        let r = self.renderer;
        let text = frame.text;

        match frame.element {
            Element::Paragraph => self.push_block(r.paragraph(&text)),
            Element::Heading(level) => self.push_block(r.header(&text, level)),
            Element::BlockQuote => self.push_block(r.block_quote(&text)),
            Element::CodeBlock(language) => {
                self.push_block(r.block_code(&text, language.as_deref()))
            }
            Element::HtmlBlock => self.push_block(r.block_html(&text)),
            Element::List(list_type) => self.push_block(r.list(&text, list_type)),
            Element::Item(list_type) => {
                let mut text = text;
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                self.push(r.list_item(&text, list_type));
            }
            Element::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                self.footnote_defs.push((number, r.footnote_def(&text, number)));
            }

            Element::TableCell => {
                let header = matches!(self.top().element, Element::TableHead);
                let alignment = match self.table.as_mut() {
                    Some(table) => {
                        let alignment = table
                            .alignments
                            .get(table.column)
                            .copied()
                            .unwrap_or(Alignment::None);
                        table.column += 1;
                        alignment
                    }
                    None => Alignment::None,
                };
                self.push(r.table_cell(&text, alignment, header));
            }
            Element::TableHead => {
                let row = r.table_row(&text);
                if let Some(table) = self.table.as_mut() {
                    table.header.push_str(&row);
                }
            }
            Element::TableRow => self.push(r.table_row(&text)),
            Element::Table => {
                let header = self
                    .table
                    .take()
                    .map(|table| table.header)
                    .unwrap_or_default();
                let fragment = r.table(&header, &text)?;
                self.push_block(fragment);
            }

            Element::Emphasis { underline: true } => self.push(r.underline(&text)),
            Element::Emphasis { underline: false } => match frame.sole_span {
                Some((SpanKind::Strong, inner)) if frame.pieces == 1 => {
                    self.push(r.triple_emphasis(&inner))
                }
                _ => {
                    let fragment = r.emphasis(&text);
                    self.push_span(fragment, Some((SpanKind::Emphasis, text)));
                }
            },
            Element::Strong => match frame.sole_span {
                Some((SpanKind::Emphasis, inner)) if frame.pieces == 1 => {
                    self.push(r.triple_emphasis(&inner))
                }
                _ => {
                    let fragment = r.double_emphasis(&text);
                    self.push_span(fragment, Some((SpanKind::Strong, text)));
                }
            },
            Element::Strikethrough => self.push(r.strikethrough(&text)),
            Element::Superscript => self.push(r.superscript(&text)),
            Element::Link { dest, title } => self.push(r.link(&dest, title.as_deref(), &text)),
            Element::Autolink { dest, link_type } => self.push(r.autolink(&dest, link_type)),

            // Document is never popped
            Element::Quote | Element::Other | Element::Document => self.push(text),
        }

        Ok(())
    }

    fn reset_column(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.column = 0;
        }
    }

    fn image_event(&mut self, event: Event<'_>) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        match event {
            Event::Start(Tag::Image { .. }) => image.depth += 1,
            Event::End(TagEnd::Image) if image.depth > 0 => image.depth -= 1,
            Event::End(TagEnd::Image) => {
                if let Some(image) = self.image.take() {
                    let alt = image.alt.trim();
                    let alt = (!alt.is_empty()).then(|| self.renderer.normal_text(alt));
                    let fragment =
                        self.renderer
                            .image(&image.dest, image.title.as_deref(), alt.as_deref());
                    self.push(fragment);
                }
            }
            Event::Text(text) | Event::Code(text) => image.alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        self.collapse_quotes();
        // Fold anything left open into its parent
        while self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                self.push(frame.text);
            }
        }

        let mut out = self.frames.pop().map(|frame| frame.text).unwrap_or_default();

        if !self.footnote_defs.is_empty() {
            debug!(count = self.footnote_defs.len(), "emitting footnotes");
            self.footnote_defs.sort_by_key(|(number, _)| *number);
            let defs: String = self
                .footnote_defs
                .iter()
                .map(|(_, def)| def.as_str())
                .collect();
            out.push_str(&self.renderer.footnotes(&defs));
        }

        out
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
