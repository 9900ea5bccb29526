//! Inline Markdown to storage markup.
//!
//! Substitutions run in a fixed order: images, links, bold, italic,
//! strikethrough, code, line breaks. Generated markup is parked in a side
//! table behind placeholder characters so that later stages and the final
//! XML escaping of the text never touch it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::xml::escape;

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static IMAGE_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\|width=(\d+)$").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br\s*/?>").unwrap());

const PLACEHOLDER_START: char = '\u{e000}';
const PLACEHOLDER_END: char = '\u{e001}';

/// Converts inline Markdown, recording image paths as they are found.
pub(crate) struct InlineConverter<'a> {
    images: &'a mut Vec<String>,
    stash: Vec<String>,
}

impl<'a> InlineConverter<'a> {
    pub(crate) fn new(images: &'a mut Vec<String>) -> Self {
        Self {
            images,
            stash: Vec::new(),
        }
    }

    /// Convert one piece of inline Markdown.
    pub(crate) fn convert(mut self, text: &str) -> String {
        let text = text.replace([PLACEHOLDER_START, PLACEHOLDER_END], "");

        let text = IMAGE
            .replace_all(&text, |caps: &Captures| self.image(&caps[1], &caps[2]))
            .into_owned();
        let text = LINK
            .replace_all(&text, |caps: &Captures| {
                let open = self.park(format!(r#"<a href="{}">"#, escape(&caps[2])));
                let close = self.park("</a>".to_owned());
                format!("{open}{}{close}", &caps[1])
            })
            .into_owned();
        let text = self.wrap(&text, &BOLD_STARS, "strong");
        let text = self.wrap(&text, &BOLD_UNDERSCORES, "strong");
        let text = self.wrap(&text, &ITALIC_STAR, "em");
        let text = self.underscore_emphasis(&text);
        let text = self.wrap(&text, &STRIKE, "del");
        let text = self.wrap(&text, &CODE, "code");
        let text = LINE_BREAK
            .replace_all(&text, |_: &Captures| self.park("<br/>".to_owned()))
            .into_owned();

        self.expand(&escape(&text))
    }

    fn image(&mut self, alt: &str, path: &str) -> String {
        self.images.push(path.to_owned());
        let filename = path.rsplit('/').next().unwrap_or(path);

        let (alt, width) = match IMAGE_WIDTH.captures(alt) {
            Some(caps) => (
                caps.get(1).map_or(alt, |m| m.as_str()),
                caps.get(2).map(|m| m.as_str()),
            ),
            None => (alt, None),
        };
        let width = width
            .map(|width| format!(r#" ac:width="{width}""#))
            .unwrap_or_default();

        self.park(format!(
            r#"<ac:image ac:alt="{}"{width}><ri:attachment ri:filename="{}"/></ac:image>"#,
            escape(alt),
            escape(filename)
        ))
    }

    /// Replace `re` matches with `<tag>inner</tag>`, leaving inner text in place.
    fn wrap(&mut self, text: &str, re: &Regex, tag: &str) -> String {
        re.replace_all(text, |caps: &Captures| {
            let open = self.park(format!("<{tag}>"));
            let close = self.park(format!("</{tag}>"));
            format!("{open}{}{close}", &caps[1])
        })
        .into_owned()
    }

    /// `_text_` emphasis, only where neither underscore touches a word character.
    fn underscore_emphasis(&mut self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            let opens = chars[i] == '_' && (i == 0 || !is_word(chars[i - 1]));
            if opens && let Some(close) = closing_underscore(&chars, i) {
                out.push_str(&self.park("<em>".to_owned()));
                out.extend(&chars[i + 1..close]);
                out.push_str(&self.park("</em>".to_owned()));
                i = close + 1;
                continue;
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }

    fn park(&mut self, markup: String) -> String {
        let index = self.stash.len();
        self.stash.push(markup);
        format!("{PLACEHOLDER_START}{index}{PLACEHOLDER_END}")
    }

    fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(PLACEHOLDER_START) {
            out.push_str(&rest[..start]);
            let after = &rest[start + PLACEHOLDER_START.len_utf8()..];
            let Some(end) = after.find(PLACEHOLDER_END) else {
                rest = after;
                continue;
            };
            if let Some(markup) = after[..end]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.stash.get(index))
            {
                out.push_str(markup);
            }
            rest = &after[end + PLACEHOLDER_END.len_utf8()..];
        }
        out.push_str(rest);
        out
    }
}

fn closing_underscore(chars: &[char], open: usize) -> Option<usize> {
    for close in open + 2..chars.len() {
        if chars[close] == '\n' || chars[close - 1] == '\n' {
            return None;
        }
        if chars[close] == '_' && chars.get(close + 1).is_none_or(|&c| !is_word(c)) {
            return Some(close);
        }
    }
    None
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
