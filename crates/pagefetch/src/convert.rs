//! HTML to markdown rendering
//!
//! A single-pass tag scanner. It is not a full HTML parser; it is fed either
//! readability output (already well formed) or a whole document as the
//! recall fallback.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Chars;
use url::Url;

/// Elements whose content is never rendered
const SKIP_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "iframe", "svg", "template",
];

/// Elements whose content is raw text and may contain `<`
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Href prefixes that are rendered as plain text
const INERT_HREF_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:", "data:"];

/// Rendering switches
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Render anchors as `[text](url)`
    pub include_links: bool,
    /// Render images with alt-text as `![alt](src)`
    pub include_images: bool,
    /// Render tables as pipe tables (dropped otherwise)
    pub include_tables: bool,
    /// Keep bold, italic and inline code markers
    pub include_formatting: bool,
    /// Base for resolving relative link and image targets
    pub base_url: Option<Url>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_links: true,
            include_images: false,
            include_tables: true,
            include_formatting: true,
            base_url: None,
        }
    }
}

/// Convert HTML to markdown
pub fn html_to_markdown(html: &str, options: &MarkdownOptions) -> String {
    let mut renderer = Renderer::new(options);
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '<' {
            let tag = read_tag(&mut chars);
            renderer.tag(&tag);
            if let Some(name) = renderer.open_raw_text() {
                skip_raw_text(&mut chars, &name);
                renderer.skip.pop();
            }
        } else if renderer.skip.is_empty() {
            let decoded = decode_entity(c, &mut chars);
            renderer.text(decoded);
        }
    }

    clean_whitespace(&renderer.out)
}

#[derive(Debug, Default, Clone, Copy)]
struct TableState {
    row: usize,
    cells: usize,
    in_cell: bool,
}

struct Renderer<'a> {
    options: &'a MarkdownOptions,
    out: String,
    skip: Vec<String>,
    list_depth: usize,
    quote_depth: usize,
    in_pre: bool,
    /// Open anchors: target and position of the opening bracket
    anchors: Vec<Option<(String, usize)>>,
    tables: Vec<TableState>,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a MarkdownOptions) -> Self {
        Self {
            options,
            out: String::new(),
            skip: Vec::new(),
            list_depth: 0,
            quote_depth: 0,
            in_pre: false,
            anchors: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Name of the raw-text element just opened, if any
    fn open_raw_text(&self) -> Option<String> {
        self.skip
            .last()
            .filter(|name| RAW_TEXT_TAGS.contains(&name.as_str()))
            .cloned()
    }

    fn in_cell(&self) -> bool {
        self.tables.last().is_some_and(|t| t.in_cell)
    }

    /// Line break that keeps table rows on one line and blockquotes quoted
    fn newline(&mut self, count: usize) {
        if self.in_cell() {
            self.out.push(' ');
            return;
        }
        for _ in 0..count {
            self.out.push('\n');
            if self.quote_depth > 0 {
                self.out.push_str("> ");
            }
        }
    }

    fn text(&mut self, c: char) {
        if self.in_pre {
            self.out.push(c);
        } else if c.is_whitespace() {
            // no padding right after an opening bracket
            if !self.out.ends_with('[') {
                self.out.push(' ');
            }
        } else {
            self.out.push(c);
        }
    }

    fn resolve(&self, target: &str) -> String {
        match &self.options.base_url {
            Some(base) => base
                .join(target)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| target.to_string()),
            None => target.to_string(),
        }
    }

    fn tag(&mut self, raw: &str) {
        if raw.starts_with('!') || raw.starts_with('?') {
            // comments, doctype, processing instructions
            return;
        }

        let lower = raw.to_ascii_lowercase();
        let is_closing = lower.starts_with('/');
        let tag_name = lower
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        let self_closing = raw.trim_end().ends_with('/');

        // `</head>` is optional; an opening `<body>` ends the head
        if tag_name == "body" && !is_closing {
            if let Some(pos) = self.skip.iter().rposition(|t| t == "head") {
                self.skip.truncate(pos);
            }
        }

        let skipped =
            SKIP_TAGS.contains(&tag_name) || (!self.options.include_tables && tag_name == "table");
        if skipped {
            if is_closing {
                if let Some(pos) = self.skip.iter().rposition(|t| t == tag_name) {
                    self.skip.truncate(pos);
                }
            } else if !self_closing {
                self.skip.push(tag_name.to_string());
            }
            return;
        }

        if !self.skip.is_empty() {
            return;
        }

        let formatting = self.options.include_formatting;

        match tag_name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.newline(2);
                if !is_closing {
                    let level = tag_name[1..].parse::<usize>().unwrap_or(1);
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                }
            }
            "p" => self.newline(2),
            "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "nav"
            | "figure" | "figcaption" | "dl" | "dt" | "dd" | "form" => {
                if is_closing {
                    self.newline(2);
                }
            }
            "br" => self.newline(1),
            "hr" => {
                self.newline(2);
                self.out.push_str("---");
                self.newline(2);
            }
            "ul" | "ol" => {
                if is_closing {
                    self.list_depth = self.list_depth.saturating_sub(1);
                    if self.list_depth == 0 {
                        self.newline(2);
                    }
                } else {
                    if self.list_depth == 0 {
                        self.newline(2);
                    }
                    self.list_depth += 1;
                }
            }
            "li" => {
                if !is_closing {
                    self.newline(1);
                    let indent = self.list_depth.saturating_sub(1);
                    self.out.push_str(&"  ".repeat(indent));
                    self.out.push_str("- ");
                }
            }
            "strong" | "b" if formatting => self.out.push_str("**"),
            "em" | "i" if formatting => self.out.push('*'),
            "del" | "s" | "strike" if formatting => self.out.push_str("~~"),
            "code" if formatting && !self.in_pre => self.out.push('`'),
            "pre" => {
                self.out.push_str("\n```\n");
                self.in_pre = !is_closing;
            }
            "blockquote" => {
                if is_closing {
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                    self.newline(2);
                } else {
                    self.quote_depth += 1;
                    self.newline(2);
                }
            }
            "a" => {
                if is_closing {
                    self.close_anchor();
                } else {
                    self.open_anchor(raw);
                }
            }
            "img" => {
                if self.options.include_images {
                    self.image(raw);
                }
            }
            "table" => {
                if is_closing {
                    self.tables.pop();
                } else {
                    self.tables.push(TableState::default());
                }
                self.newline(2);
            }
            "tr" => self.table_row(is_closing),
            "td" | "th" => self.table_cell(is_closing),
            _ => {}
        }
    }

    fn open_anchor(&mut self, raw: &str) {
        let target = extract_attribute(raw, "href")
            .map(|href| decode_entities(href.trim()))
            .filter(|href| {
                let lower = href.to_ascii_lowercase();
                !href.is_empty() && !INERT_HREF_PREFIXES.iter().any(|p| lower.starts_with(p))
            });

        match target {
            Some(href) if self.options.include_links => {
                let target = self.resolve(&href);
                self.anchors.push(Some((target, self.out.len())));
                self.out.push('[');
            }
            _ => self.anchors.push(None),
        }
    }

    fn close_anchor(&mut self) {
        let Some(Some((target, start))) = self.anchors.pop() else {
            return;
        };
        if start >= self.out.len() || !self.out.is_char_boundary(start) {
            return;
        }
        if self.out[start + 1..].trim().is_empty() {
            // nothing visible to link
            self.out.truncate(start);
            return;
        }
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        self.out.push_str("](");
        self.out.push_str(&target);
        self.out.push(')');
    }

    fn image(&mut self, raw: &str) {
        let alt = extract_attribute(raw, "alt")
            .map(|a| decode_entities(a.trim()))
            .unwrap_or_default();
        if alt.is_empty() {
            return;
        }
        match extract_attribute(raw, "src").filter(|s| !s.trim().is_empty()) {
            Some(src) => {
                let src = self.resolve(&decode_entities(src.trim()));
                self.out.push_str(&format!("![{alt}]({src})"));
            }
            None => self.out.push_str(&alt),
        }
    }

    fn table_row(&mut self, is_closing: bool) {
        let Some(state) = self.tables.last().copied() else {
            return;
        };
        if is_closing {
            if state.row == 0 && state.cells > 0 {
                self.newline(1);
                self.out.push('|');
                self.out.push_str(&" --- |".repeat(state.cells));
            }
            if let Some(t) = self.tables.last_mut() {
                t.row += 1;
                t.cells = 0;
                t.in_cell = false;
            }
        } else {
            if let Some(t) = self.tables.last_mut() {
                t.cells = 0;
                t.in_cell = false;
            }
            self.newline(1);
            self.out.push('|');
        }
    }

    fn table_cell(&mut self, is_closing: bool) {
        let Some(t) = self.tables.last_mut() else {
            return;
        };
        if is_closing {
            t.in_cell = false;
            t.cells += 1;
            self.out.push_str(" |");
        } else {
            t.in_cell = true;
            self.out.push(' ');
        }
    }
}

/// Read a tag body up to the closing `>`, honoring quoted attribute values
fn read_tag(chars: &mut Peekable<Chars>) -> String {
    let mut tag = String::new();

    if chars.peek() == Some(&'!') {
        // comments may contain '>' and run until "-->"
        while let Some(c) = chars.next() {
            tag.push(c);
            if tag.starts_with("!--") {
                if tag.len() > 4 && tag.ends_with("--") && chars.peek() == Some(&'>') {
                    chars.next();
                    break;
                }
            } else if chars.peek() == Some(&'>') {
                chars.next();
                break;
            }
        }
        return tag;
    }

    let mut quote: Option<char> = None;
    for c in chars.by_ref() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => break,
            None => {}
        }
        tag.push(c);
    }
    tag
}

/// Consume raw text up to and including the closing tag of `name`
fn skip_raw_text(chars: &mut Peekable<Chars>, name: &str) {
    let closing: Vec<char> = format!("</{name}").chars().collect();
    let mut window: VecDeque<char> = VecDeque::with_capacity(closing.len());

    while let Some(c) = chars.next() {
        if window.len() == closing.len() {
            window.pop_front();
        }
        window.push_back(c.to_ascii_lowercase());
        if window.iter().eq(closing.iter()) {
            for c in chars.by_ref() {
                if c == '>' {
                    break;
                }
            }
            return;
        }
    }
}

/// Extract attribute value from tag
fn extract_attribute(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{}=", attr);
    let tag_lower = tag.to_ascii_lowercase();

    let start = tag_lower.match_indices(&pattern).find_map(|(idx, _)| {
        let preceded_by_space = tag_lower[..idx]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        preceded_by_space.then_some(idx)
    })?;

    let rest = tag[start + pattern.len()..].trim_start();
    if let Some(rest) = rest.strip_prefix('"') {
        rest.find('"').map(|end| rest[..end].to_string())
    } else if let Some(rest) = rest.strip_prefix('\'') {
        rest.find('\'').map(|end| rest[..end].to_string())
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

/// Decode every entity in an attribute value
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(decode_entity(c, &mut chars));
    }
    out
}

/// Decode HTML entity starting from ampersand
///
/// The iterator only advances when a known entity is found; otherwise the
/// ampersand is returned as-is and the following text is left untouched.
fn decode_entity(c: char, chars: &mut Peekable<Chars>) -> char {
    if c != '&' {
        return c;
    }

    let mut probe = chars.clone();
    let mut entity = String::new();
    let mut terminated = false;
    for next in probe.by_ref() {
        if next == ';' {
            terminated = true;
            break;
        }
        if next.is_whitespace() || next == '&' || entity.len() > 10 {
            break;
        }
        entity.push(next);
    }
    if !terminated {
        return '&';
    }

    let decoded = match entity.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        _ => entity.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(ch) => {
            *chars = probe;
            ch
        }
        None => '&',
    }
}

/// Normalize rendered markdown line by line
///
/// Collapses space runs (keeping list indentation), leaves fenced code
/// untouched, drops empty quote markers and keeps at most one blank line.
pub fn clean_whitespace(s: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in s.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            lines.push(trimmed.to_string());
            continue;
        }
        if in_fence {
            lines.push(line.trim_end().to_string());
            continue;
        }

        let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed == ">" {
            lines.push(String::new());
            continue;
        }
        let indent = if collapsed.starts_with("- ") {
            line.len() - line.trim_start().len()
        } else {
            0
        };
        lines.push(format!("{}{}", " ".repeat(indent), collapsed));
    }

    filter_excessive_newlines(&lines.join("\n"))
        .trim()
        .to_string()
}

/// Filter excessive newlines: keep at most 2 consecutive newlines
pub fn filter_excessive_newlines(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}
