use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use colored::Colorize;

use crate::core::content::ContentStore;
use crate::models::Post;
use crate::utils::markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// 内容检查发现的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        write!(f, "{}: {}: {}", label, self.path.display(), self.message)
    }
}

/// 检查结果
#[derive(Debug, Default)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
    /// 检查过的文件数
    pub files: usize,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }
}

/// 检查内容仓库中的所有文件
pub fn check(store: &ContentStore) -> CheckReport {
    let mut report = CheckReport {
        findings: Vec::new(),
        files: store.posts.len() + store.issues.len(),
    };

    for issue in &store.issues {
        report.findings.push(Finding {
            severity: Severity::Error,
            path: issue.path.clone(),
            message: issue.error.to_string(),
        });
    }

    for post in &store.posts {
        check_post(post, &mut report.findings);
    }

    // 标题相同的文章只提示，不判断哪一篇是多余的
    let mut by_title: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in &store.posts {
        if let Some(title) = post.front_matter.title.as_deref() {
            by_title.entry(title).or_default().push(post);
        }
    }
    for (title, posts) in by_title.into_iter().filter(|(_, posts)| posts.len() > 1) {
        for post in &posts {
            let others: Vec<String> = posts
                .iter()
                .filter(|other| other.source != post.source)
                .map(|other| other.source.display().to_string())
                .collect();
            report.findings.push(Finding {
                severity: Severity::Warning,
                path: post.source.clone(),
                message: format!("标题 {:?} 与 {} 重复", title, others.join(", ")),
            });
        }
    }

    report
        .findings
        .sort_by(|a, b| a.path.cmp(&b.path).then(b.severity.cmp(&a.severity)));
    report
}

fn check_post(post: &Post, findings: &mut Vec<Finding>) {
    let mut push = |severity, message: String| {
        findings.push(Finding {
            severity,
            path: post.source.clone(),
            message,
        })
    };

    if post.front_matter.title.is_none() {
        push(Severity::Error, "缺少 title".to_string());
    }

    if let Some(file_date) = post.file_date() {
        match &post.front_matter.date {
            None => push(Severity::Error, "缺少 date".to_string()),
            Some(date) if !post.date_matches_file_name() => push(
                Severity::Error,
                format!(
                    "前置数据日期 {} 与文件名日期 {} 不一致",
                    date.date_naive(),
                    file_date
                ),
            ),
            Some(_) => {}
        }
    }

    for fence in markdown::code_fences(&post.body) {
        if fence.language.is_none() {
            push(
                Severity::Warning,
                format!("正文第 {} 行的代码块没有声明语言", fence.line),
            );
        }
    }
}
