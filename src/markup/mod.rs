//! 文本处理层（Markup）
//!
//! 纯函数，不接触浏览器：
//! - `math` - MathML 树与线性记法转换
//! - `cleanup` - 渲染 HTML 的清洗

pub mod cleanup;
pub mod math;

pub use cleanup::clean;
pub use math::{convert, MarkupNode, MathKind};
