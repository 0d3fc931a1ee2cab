//! 文本清洗
//!
//! 渲染后的 HTML → 干净的题目文本：去掉非内容元素、数学公式转线性记法、
//! 去掉界面标题短语、统一数学符号和空白。对自己的输出幂等。

use std::sync::LazyLock;

use phf::phf_set;
use regex::{Captures, Regex};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

use crate::markup::math::MarkupNode;

/// 直接丢弃的标签（装饰图形、表格布局、图片、样式、脚本）
static NON_CONTENT_TAGS: phf::Set<&'static str> = phf_set! {
    "svg", "table", "img", "figure", "style", "script",
};

/// 只给读屏器看的类名
static HIDDEN_CLASSES: phf::Set<&'static str> = phf_set! {
    "sr-only", "visually-hidden",
};

/// 界面标题短语，按整词匹配、忽略大小写
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "Explanation",
    "Step by step",
    "Question Info",
    "Section",
    "Score Band",
    "Mark for Review",
];

/// 携带原始 MathML 的属性
const MATHML_ATTRIBUTE: &str = "data-mathml";

static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = BOILERPLATE_PHRASES
        .iter()
        .map(|phrase| {
            phrase
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?im)\b(?:{})\b", alternatives)).expect("boilerplate pattern is valid")
});

/// 认得的 HTML / MathML 标签，只有这些才算标记
static MARKUP_TAGS: phf::Set<&'static str> = phf_set! {
    "html", "head", "body", "div", "span", "p", "br", "hr", "a", "b", "i", "u", "s",
    "em", "strong", "small", "sub", "sup", "mark", "code", "pre", "blockquote", "q",
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd",
    "table", "thead", "tbody", "tfoot", "tr", "td", "th", "caption", "col", "colgroup",
    "img", "svg", "canvas", "figure", "figcaption", "picture", "source",
    "section", "article", "aside", "header", "footer", "main", "nav", "label", "button",
    "input", "form", "select", "option", "textarea", "dialog", "details", "summary",
    "style", "script", "noscript", "template", "font", "center",
    "math", "mi", "mn", "mo", "mtext", "ms", "mrow", "mfrac", "msup", "msub", "msubsup",
    "msqrt", "mroot", "mfenced", "mstyle", "semantics", "annotation", "mspace",
    "mtable", "mtr", "mtd", "munder", "mover", "munderover",
};

/// 形如标签的片段，标签名在第 1 组
static TAG_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?/?>").expect("tag pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("entity pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// 清洗一段渲染后的 HTML
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = if looks_like_markup(raw) {
        visible_text(raw)
    } else {
        raw.to_string()
    };

    normalize_text(&text)
}

/// 纯文本阶段：去标题短语、替换符号、拆开残留的标记、压缩空白
///
/// 输出里不会再有认得的标签或实体引用，再次清洗时只走纯文本分支。
pub fn normalize_text(text: &str) -> String {
    let mut current = text.to_string();
    // 删掉一个短语可能拼出另一个，直到不再变化
    while BOILERPLATE.is_match(&current) {
        current = BOILERPLATE.replace_all(&current, "").into_owned();
    }

    let current = current
        .replace('\u{2212}', "-")
        .replace('\u{00D7}', "*")
        .replace('\u{00F7}', "/");
    let current = defuse_markup(&current);

    WHITESPACE.replace_all(&current, " ").trim().to_string()
}

/// 含有认得的标签或实体引用时才按 HTML 解析
fn looks_like_markup(text: &str) -> bool {
    ENTITY.is_match(text)
        || TAG_LIKE
            .captures_iter(text)
            .any(|caps| is_markup_tag(&caps[1]))
}

fn is_markup_tag(name: &str) -> bool {
    MARKUP_TAGS.contains(name.to_ascii_lowercase().as_str())
}

/// 解码出来的 `<b>`、`&lt;` 这类文字在 `<` / `&` 后插入空格，避免下次被当成标记
fn defuse_markup(text: &str) -> String {
    let text = TAG_LIKE.replace_all(text, |caps: &Captures<'_>| {
        let whole = &caps[0];
        if is_markup_tag(&caps[1]) {
            format!("< {}", &whole[1..])
        } else {
            whole.to_string()
        }
    });
    ENTITY
        .replace_all(&text, |caps: &Captures<'_>| format!("& {}", &caps[0][1..]))
        .into_owned()
}

/// 解析 HTML 并按单个空格拼接可见文本
fn visible_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut segments = Vec::new();
    collect_segments(fragment.root_element(), &mut segments);
    segments.join(" ")
}

fn collect_segments(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_segment(out, &text.text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    visit_element(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn visit_element(element: ElementRef<'_>, out: &mut Vec<String>) {
    let value = element.value();
    if is_non_content(value) {
        return;
    }

    if value.name().eq_ignore_ascii_case("math") {
        push_segment(out, &MarkupNode::from_element(element).to_linear());
        return;
    }

    if let Some(payload) = value.attr(MATHML_ATTRIBUTE) {
        match MarkupNode::parse(payload) {
            Some(math) => {
                push_segment(out, &math.to_linear());
                return;
            }
            None => debug!("跳过无法解析的 {} 内容", MATHML_ATTRIBUTE),
        }
    }

    collect_segments(element, out);
}

fn is_non_content(element: &Element) -> bool {
    if NON_CONTENT_TAGS.contains(element.name().to_ascii_lowercase().as_str()) {
        return true;
    }
    if element.classes().any(|class| HIDDEN_CLASSES.contains(class)) {
        return true;
    }
    element.attr("style").is_some_and(has_transparent_color)
}

/// 内联样式把前景色设为透明（常见的隐藏文本手法）
fn has_transparent_color(style: &str) -> bool {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .any(|(property, value)| {
            property.trim().eq_ignore_ascii_case("color")
                && value.trim().to_ascii_lowercase().starts_with("transparent")
        })
}

fn push_segment(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
