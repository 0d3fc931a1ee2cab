//! MathML → 线性记法
//!
//! `\frac{a}{b}`、`a^b`、`sqrt(x)`、`[x]` 这类紧凑文本。转换是全函数：
//! 不认识的节点按子节点拼接处理，永不失败。

use scraper::node::Element;
use scraper::{ElementRef, Html, Node};

/// 数学节点类别
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathKind {
    /// mi / mn / mo / mtext / ms
    Token,
    /// math / mrow / mstyle / semantics
    Group,
    /// mfrac
    Fraction,
    /// msup
    Superscript,
    /// msqrt
    SquareRoot,
    /// mfenced，带开闭定界符
    Fenced { open: String, close: String },
    /// 其他一律拼接子节点
    Other,
}

impl MathKind {
    /// 按标签名识别类别
    pub fn from_element(element: &Element) -> Self {
        match element.name().to_ascii_lowercase().as_str() {
            "mi" | "mn" | "mo" | "mtext" | "ms" => MathKind::Token,
            "math" | "mrow" | "mstyle" | "semantics" => MathKind::Group,
            "mfrac" => MathKind::Fraction,
            "msup" => MathKind::Superscript,
            "msqrt" => MathKind::SquareRoot,
            "mfenced" => MathKind::Fenced {
                open: element.attr("open").unwrap_or("(").to_string(),
                close: element.attr("close").unwrap_or(")").to_string(),
            },
            _ => MathKind::Other,
        }
    }
}

/// 数学标记树
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// 原始文本叶子
    Text(String),
    Element {
        kind: MathKind,
        children: Vec<MarkupNode>,
    },
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        MarkupNode::Text(text.into())
    }

    pub fn element(kind: MathKind, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element { kind, children }
    }

    /// 从已解析的 HTML 元素构建
    pub fn from_element(element: ElementRef<'_>) -> Self {
        let kind = MathKind::from_element(element.value());
        let children = element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(MarkupNode::Text(text.to_string())),
                Node::Element(_) => ElementRef::wrap(child).map(MarkupNode::from_element),
                _ => None,
            })
            .collect();
        MarkupNode::Element { kind, children }
    }

    /// 解析一段独立的 MathML
    ///
    /// 缺少外层 `<math>` 时自动补上；找不到任何数学元素返回 `None`。
    pub fn parse(payload: &str) -> Option<Self> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return None;
        }

        let source = if trimmed.to_ascii_lowercase().starts_with("<math") {
            trimmed.to_string()
        } else {
            format!("<math>{}</math>", trimmed)
        };

        let fragment = Html::parse_fragment(&source);
        let root = fragment.root_element();
        let math = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name().eq_ignore_ascii_case("math"))?;
        Some(MarkupNode::from_element(math))
    }

    /// 转换为线性记法
    pub fn to_linear(&self) -> String {
        let (kind, children) = match self {
            MarkupNode::Text(text) => return text.trim().to_string(),
            MarkupNode::Element { kind, children } => (kind, children),
        };

        match kind {
            MathKind::Token => text_content(children),
            MathKind::Group | MathKind::Other => concat(children),
            MathKind::Fraction => match two_operands(children) {
                Some((num, den)) => format!("\\frac{{{}}}{{{}}}", num.to_linear(), den.to_linear()),
                None => concat(children),
            },
            MathKind::Superscript => match two_operands(children) {
                Some((base, exp)) => format!("{}^{}", base.to_linear(), exp.to_linear()),
                None => concat(children),
            },
            MathKind::SquareRoot => format!("sqrt({})", concat(children)),
            MathKind::Fenced { open, close } => format!("{}{}{}", open, concat(children), close),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            MarkupNode::Text(text) => text.trim().is_empty(),
            MarkupNode::Element { .. } => false,
        }
    }
}

/// 转换入口，空节点返回空串
pub fn convert(node: Option<&MarkupNode>) -> String {
    node.map(MarkupNode::to_linear).unwrap_or_default()
}

fn concat(children: &[MarkupNode]) -> String {
    children.iter().map(MarkupNode::to_linear).collect()
}

/// 前两个非空白子节点
fn two_operands(children: &[MarkupNode]) -> Option<(&MarkupNode, &MarkupNode)> {
    let mut operands = children.iter().filter(|c| !c.is_blank());
    Some((operands.next()?, operands.next()?))
}

/// 所有文本叶子逐个去空白后直接相连
fn text_content(children: &[MarkupNode]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            MarkupNode::Text(text) => out.push_str(text.trim()),
            MarkupNode::Element { children, .. } => out.push_str(&text_content(children)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str) -> MarkupNode {
        MarkupNode::element(MathKind::Token, vec![MarkupNode::text(text)])
    }

    #[test]
    fn test_fraction_with_two_children() {
        let node = MarkupNode::element(
            MathKind::Fraction,
            vec![MarkupNode::text("\n  "), token("a"), MarkupNode::text(" "), token("b")],
        );
        assert_eq!(node.to_linear(), "\\frac{a}{b}");
    }

    #[test]
    fn test_fraction_degrades_to_concatenation() {
        let single = MarkupNode::element(MathKind::Fraction, vec![token("a"), MarkupNode::text("  ")]);
        assert_eq!(single.to_linear(), "a");

        let empty = MarkupNode::element(MathKind::Fraction, vec![]);
        assert_eq!(empty.to_linear(), "");
    }

    #[test]
    fn test_superscript() {
        let node = MarkupNode::element(MathKind::Superscript, vec![token("x"), token("2")]);
        assert_eq!(node.to_linear(), "x^2");

        let lone = MarkupNode::element(MathKind::Superscript, vec![token("x")]);
        assert_eq!(lone.to_linear(), "x");
    }

    #[test]
    fn test_square_root_and_fenced() {
        let root = MarkupNode::element(
            MathKind::SquareRoot,
            vec![token("x"), token("+"), token("1")],
        );
        assert_eq!(root.to_linear(), "sqrt(x+1)");

        let fenced = MarkupNode::element(
            MathKind::Fenced {
                open: "[".to_string(),
                close: "]".to_string(),
            },
            vec![token("x")],
        );
        assert_eq!(fenced.to_linear(), "[x]");
    }

    #[test]
    fn test_unknown_kind_concatenates() {
        let node = MarkupNode::element(MathKind::Other, vec![token("a"), MarkupNode::text("b")]);
        assert_eq!(node.to_linear(), "ab");
    }

    #[test]
    fn test_convert_none_is_empty() {
        assert_eq!(convert(None), "");
        assert_eq!(convert(Some(&MarkupNode::text("  y "))), "y");
    }

    #[test]
    fn test_parse_nested_mathml() {
        let node = MarkupNode::parse(
            r#"<math><mrow><mfrac><mn>1</mn><msup><mi>x</mi><mn>2</mn></msup></mfrac><mo>+</mo><msqrt><mn>3</mn></msqrt></mrow></math>"#,
        )
        .unwrap();
        assert_eq!(node.to_linear(), "\\frac{1}{x^2}+sqrt(3)");
    }

    #[test]
    fn test_parse_synthesizes_wrapper() {
        let node = MarkupNode::parse("<mfenced open=\"[\" close=\"]\"><mi>a</mi></mfenced>").unwrap();
        assert_eq!(node.to_linear(), "[a]");

        let defaults = MarkupNode::parse("<mfenced><mi>b</mi></mfenced>").unwrap();
        assert_eq!(defaults.to_linear(), "(b)");
    }

    #[test]
    fn test_parse_blank_payload() {
        assert!(MarkupNode::parse("   ").is_none());
    }
}
