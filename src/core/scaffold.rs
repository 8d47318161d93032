use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use tera::{Context as TeraContext, Tera};
use tracing::info;

use crate::error::BlogError;
use crate::models::types::PostFileName;
use crate::models::Config;
use crate::utils;

/// 内置的文章脚手架
const DEFAULT_POST_SCAFFOLD: &str = r#"---
{%- if author %}
author: {{ author_yaml }}
{%- endif %}
title: {{ title_yaml }}
date: {{ date }}
categories:
tags:
published: false
---

"#;

/// 在文章目录中创建一篇未发布的新文章，返回文件路径
pub fn new_post(config: &Config, site_dir: &Path, title: &str, date: DateTime<FixedOffset>) -> Result<PathBuf> {
    let name = PostFileName {
        date: date.date_naive(),
        slug: utils::slugify(title),
        extension: "md".to_string(),
    };
    if name.slug.is_empty() {
        return Err(BlogError::ConfigError {
            message: format!("无法从标题生成别名: {:?}", title),
        }
        .into());
    }

    let posts_dir = site_dir.join(&config.posts_dir);
    let path = posts_dir.join(name.file_name());
    if path.exists() {
        return Err(BlogError::PostExists { path }.into());
    }

    let scaffold_path = site_dir.join(&config.scaffold_dir).join("post.md");
    let template = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)
            .with_context(|| format!("读取脚手架失败: {}", scaffold_path.display()))?
    } else {
        DEFAULT_POST_SCAFFOLD.to_string()
    };

    let mut context = TeraContext::new();
    context.insert("title", title);
    context.insert("date", &utils::format_date(&date));
    context.insert("slug", &name.slug);
    context.insert("author", &config.author);
    context.insert("title_yaml", &yaml_scalar(title)?);
    context.insert("author_yaml", &config.author.as_deref().map(yaml_scalar).transpose()?);

    let content = Tera::one_off(&template, &context, false).context("渲染文章脚手架失败")?;

    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("创建目录失败: {}", posts_dir.display()))?;
    fs::write(&path, content).with_context(|| format!("写入文章失败: {}", path.display()))?;

    info!("Created: {}", path.display());
    Ok(path)
}

/// 把字符串写成单行 YAML 标量，按需加引号和转义
fn yaml_scalar(value: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(value).context("序列化 YAML 标量失败")?;
    Ok(yaml.trim_end_matches('\n').to_string())
}

/// 将文件前置数据中的 `published` 设为 true，其余行保持原样
///
/// 返回 false 表示文章本来就已发布。
pub fn publish(path: &Path) -> Result<bool> {
    let text = fs::read_to_string(path).with_context(|| format!("读取文章失败: {}", path.display()))?;
    let (updated, changed) = set_published(&text).ok_or_else(|| BlogError::MissingFrontMatter {
        path: path.to_path_buf(),
    })?;
    if changed {
        fs::write(path, updated).with_context(|| format!("写入文章失败: {}", path.display()))?;
        info!("Published: {}", path.display());
    }
    Ok(changed)
}

/// 在前置数据块中设置 `published: true`
///
/// 没有前置数据块时返回 None。
pub fn set_published(text: &str) -> Option<(String, bool)> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return None;
    }
    let end = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| l.trim_end() == "---")
        .map(|(i, _)| i)?;

    let mut out = String::with_capacity(text.len() + 16);
    let mut found = false;
    let mut changed = false;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 && i < end && line.starts_with("published:") {
            found = true;
            let value = line["published:".len()..].trim();
            if value == "true" {
                out.push_str(line);
            } else {
                changed = true;
                out.push_str("published: true");
                out.push_str(line_ending(line));
            }
            continue;
        }
        if i == end && !found {
            changed = true;
            out.push_str("published: true");
            out.push_str(line_ending(line));
        }
        out.push_str(line);
    }
    Some((out, changed))
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
