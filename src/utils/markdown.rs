use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// 正文中的围栏代码块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    /// 正文内的行号（从 1 开始）
    pub line: usize,
    /// 声明的语言
    pub language: Option<String>,
}

/// 找出正文中所有围栏代码块及其语言
pub fn code_fences(markdown: &str) -> Vec<CodeFence> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    Parser::new_ext(markdown, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                // info 字符串的第一个词是语言，其余是属性
                let language = info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.trim_matches(|c| c == '{' || c == '}').to_string())
                    .filter(|lang| !lang.is_empty());
                let line = markdown[..range.start].matches('\n').count() + 1;
                Some(CodeFence { line, language })
            }
            _ => None,
        })
        .collect()
}
