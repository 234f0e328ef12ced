//! Markdown answer rendering for the terminal.
//!
//! The answer text is walked as a pulldown-cmark event stream. Fenced code
//! blocks carrying a language tag go through a [`CodeHighlighter`]; every
//! other code span (inline, indented, untagged) is printed as plain code.

mod highlight;

pub use highlight::{CodeHighlighter, PlainHighlighter, SyntectHighlighter};

use crossterm::style::{Attribute, Color, ContentStyle};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// How one piece of code in the answer is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSpan {
    /// Fenced block with a usable language tag.
    Highlighted { language: String, code: String },
    /// Inline code, indented blocks, and fenced blocks without a usable tag.
    Plain { code: String },
}

impl CodeSpan {
    /// Classify a code block from its kind and raw text.
    pub fn block(kind: &CodeBlockKind<'_>, text: &str) -> Self {
        let language = match kind {
            CodeBlockKind::Fenced(info) => language_tag(info),
            CodeBlockKind::Indented => None,
        };
        match language {
            Some(language) => CodeSpan::Highlighted {
                language: language.to_string(),
                code: text.strip_suffix('\n').unwrap_or(text).to_string(),
            },
            None => CodeSpan::Plain {
                code: text.to_string(),
            },
        }
    }

    pub fn inline(code: &str) -> Self {
        CodeSpan::Plain {
            code: code.to_string(),
        }
    }
}

/// Language name of a fenced block's info string.
///
/// The first word of the info string becomes a `language-<word>` class and
/// only the leading run of ASCII word characters counts, so `c++` yields `c`
/// and `+x` yields nothing.
pub fn language_tag(info: &str) -> Option<&str> {
    let word = info.split_whitespace().next()?;
    let end = word
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(word.len());
    (end > 0).then(|| &word[..end])
}

fn parser(markdown: &str) -> Parser<'_> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    Parser::new_ext(markdown, options)
}

/// Every code span in `markdown`, in document order, as the renderer sees it.
pub fn code_spans(markdown: &str) -> Vec<CodeSpan> {
    let mut spans = Vec::new();
    let mut block: Option<(CodeBlockKind<'_>, String)> = None;
    for event in parser(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => block = Some((kind, String::new())),
            Event::Text(text) => {
                if let Some((_, buf)) = block.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((kind, text)) = block.take() {
                    spans.push(CodeSpan::block(&kind, &text));
                }
            }
            Event::Code(code) => spans.push(CodeSpan::inline(&code)),
            _ => {}
        }
    }
    spans
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Emit ANSI styles for emphasis, headings, and inline code.
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Converts an answer's markdown into terminal text.
pub struct AnswerRenderer {
    highlighter: Box<dyn CodeHighlighter>,
    options: RenderOptions,
}

impl AnswerRenderer {
    pub fn new(highlighter: Box<dyn CodeHighlighter>, options: RenderOptions) -> Self {
        Self {
            highlighter,
            options,
        }
    }

    /// Uncoloured output; code passes through untouched.
    pub fn plain() -> Self {
        Self::new(Box::new(PlainHighlighter), RenderOptions { color: false })
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut writer = Writer::new(self);
        for event in parser(markdown) {
            writer.event(event);
        }
        writer.finish()
    }

    /// Style a piece of code the same way inline code is styled.
    pub fn code_text(&self, code: &str) -> String {
        self.paint(code, code_style())
    }

    /// Style a heading line.
    pub fn heading_text(&self, text: &str) -> String {
        let mut style = ContentStyle::new();
        style.attributes.set(Attribute::Bold);
        self.paint(text, style)
    }

    fn paint(&self, text: &str, style: ContentStyle) -> String {
        if self.options.color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn code(&self, span: &CodeSpan) -> String {
        match span {
            CodeSpan::Highlighted { language, code } => self.highlighter.highlight(code, language),
            CodeSpan::Plain { code } => code.clone(),
        }
    }
}

fn code_style() -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(Color::Cyan);
    style
}

struct ListState {
    next: Option<u64>,
}

/// Event-driven writer; one per `render` call.
struct Writer<'r, 'm> {
    renderer: &'r AnswerRenderer,
    out: String,
    strong: usize,
    emphasis: usize,
    strike: usize,
    link: usize,
    heading: bool,
    quote_depth: usize,
    lists: Vec<ListState>,
    in_table_head: bool,
    table_columns: usize,
    /// Target and raw text of each open link.
    links: Vec<(String, String)>,
    code_block: Option<(CodeBlockKind<'m>, String)>,
}

impl<'r, 'm> Writer<'r, 'm> {
    fn new(renderer: &'r AnswerRenderer) -> Self {
        Self {
            renderer,
            out: String::new(),
            strong: 0,
            emphasis: 0,
            strike: 0,
            link: 0,
            heading: false,
            quote_depth: 0,
            lists: Vec::new(),
            in_table_head: false,
            table_columns: 0,
            links: Vec::new(),
            code_block: None,
        }
    }

    fn event(&mut self, event: Event<'m>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some((_, buf)) = self.code_block.as_mut() {
                    buf.push_str(&text);
                } else {
                    self.text(&text);
                }
            }
            Event::Code(code) => {
                let painted = self.renderer.paint(&code, code_style());
                self.out.push_str(&painted);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
            Event::SoftBreak => self.out.push(' '),
            Event::HardBreak => self.newline(),
            Event::Rule => {
                self.block_gap();
                self.out.push_str("────────");
                self.newline();
            }
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'m>) {
        match tag {
            Tag::Paragraph => {
                if !self.in_item_head() {
                    self.block_gap();
                }
            }
            Tag::Heading { .. } => {
                self.block_gap();
                self.heading = true;
            }
            Tag::BlockQuote { .. } => {
                self.block_gap();
                self.quote_depth += 1;
                self.out.push_str("> ");
            }
            Tag::CodeBlock(kind) => {
                self.block_gap();
                self.code_block = Some((kind, String::new()));
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_gap();
                } else {
                    self.line_start();
                }
                self.lists.push(ListState { next: start });
            }
            Tag::Item => {
                self.line_start();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut().and_then(|l| l.next.as_mut()) {
                    Some(n) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    None => "- ".to_string(),
                };
                self.out.push_str(&marker);
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.link += 1;
                self.links.push((dest_url.to_string(), String::new()));
            }
            Tag::Table(_) => {
                self.block_gap();
                self.table_columns = 0;
            }
            Tag::TableHead => {
                self.line_start();
                self.in_table_head = true;
            }
            Tag::TableRow => self.line_start(),
            Tag::TableCell => {
                if self.in_table_head {
                    self.table_columns += 1;
                }
                self.out.push_str("| ");
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {}
            TagEnd::Heading(_) => self.heading = false,
            TagEnd::BlockQuote { .. } => self.quote_depth = self.quote_depth.saturating_sub(1),
            TagEnd::CodeBlock => {
                if let Some((kind, text)) = self.code_block.take() {
                    let span = CodeSpan::block(&kind, &text);
                    let rendered = self.renderer.code(&span);
                    self.code_lines(rendered.trim_end_matches('\n'));
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link | TagEnd::Image => {
                self.link = self.link.saturating_sub(1);
                if let Some((url, text)) = self.links.pop() {
                    if !url.is_empty() && text != url {
                        self.out.push_str(&format!(" ({url})"));
                    }
                }
            }
            TagEnd::TableCell => self.out.push(' '),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push('|');
                self.newline();
                self.out.push('|');
                self.out.push_str(&"---|".repeat(self.table_columns));
            }
            TagEnd::TableRow => self.out.push('|'),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let mut style = ContentStyle::new();
        if self.strong > 0 || self.heading {
            style.attributes.set(Attribute::Bold);
        }
        if self.emphasis > 0 {
            style.attributes.set(Attribute::Italic);
        }
        if self.strike > 0 {
            style.attributes.set(Attribute::CrossedOut);
        }
        if self.link > 0 {
            style.attributes.set(Attribute::Underlined);
        }
        if let Some((_, raw)) = self.links.last_mut() {
            raw.push_str(text);
        }
        let painted = self.renderer.paint(text, style);
        self.out.push_str(&painted);
    }

    /// Code block body, each line carrying the quote prefix and list indent.
    fn code_lines(&mut self, code: &str) {
        let indent = "  ".repeat(self.lists.len());
        for (i, line) in code.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            self.out.push_str(&indent);
            self.out.push_str(line);
        }
    }

    /// True right after an item marker, where a paragraph continues the line.
    fn in_item_head(&self) -> bool {
        !self.lists.is_empty() && (self.out.ends_with("- ") || self.out.ends_with(". "))
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.quote_depth {
            self.out.push_str("> ");
        }
    }

    fn line_start(&mut self) {
        if !self.out.is_empty() && !self.at_line_start() {
            self.newline();
        }
    }

    fn at_line_start(&self) -> bool {
        let quote = "> ".repeat(self.quote_depth);
        self.out.ends_with('\n') || (self.quote_depth > 0 && self.out.ends_with(&quote))
    }

    /// Separate blocks with one blank line.
    fn block_gap(&mut self) {
        if self.out.is_empty() {
            return;
        }
        let quote = "> ".repeat(self.quote_depth);
        if self.quote_depth > 0 && self.out.ends_with(&quote) {
            return;
        }
        self.line_start();
        let body = if self.quote_depth > 0 {
            self.out.trim_end_matches(quote.as_str())
        } else {
            self.out.as_str()
        };
        if !body.ends_with("\n\n") {
            self.newline();
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}
