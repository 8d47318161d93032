use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::dispatch::GeneratorFlags;
use crate::error::BlogError;
use crate::models::types::{FrontMatter, PostFileName, PostKind, RawFrontMatter, Scalar};
use crate::models::{Config, Post};
use crate::utils;

/// 无法加载的内容文件
#[derive(Debug)]
pub struct ContentIssue {
    /// 文件路径
    pub path: PathBuf,
    /// 错误
    pub error: BlogError,
}

/// 内容仓库：文章目录与草稿目录中的所有文件
#[derive(Debug, Default)]
pub struct ContentStore {
    /// 成功解析的文章，按文件路径排序
    pub posts: Vec<Post>,
    /// 解析失败的文件
    pub issues: Vec<ContentIssue>,
}

impl ContentStore {
    /// 从站点目录加载所有文章和草稿
    ///
    /// 单个文件的失败被收集到 `issues` 中，不会中断扫描。
    pub fn load(config: &Config, site_dir: &Path) -> Result<Self> {
        let posts_dir = site_dir.join(&config.posts_dir);
        let drafts_dir = site_dir.join(&config.drafts_dir);
        info!("从 {} 加载文章", posts_dir.display());

        let mut files: Vec<(PathBuf, bool)> = collect_files(&posts_dir)?
            .into_iter()
            .map(|path| (path, false))
            .collect();
        files.extend(collect_files(&drafts_dir)?.into_iter().map(|path| (path, true)));

        let results: Vec<(PathBuf, Result<Post, BlogError>)> = files
            .into_par_iter()
            .map(|(path, draft)| {
                let result = match fs::read_to_string(&path) {
                    Ok(text) => parse_post(&path, &text, draft),
                    Err(e) => Err(BlogError::InvalidFrontMatter {
                        path: path.clone(),
                        message: e.to_string(),
                    }),
                };
                (path, result)
            })
            .collect();

        let mut store = ContentStore::default();
        for (path, result) in results {
            match result {
                Ok(post) => store.posts.push(post),
                Err(error) => {
                    warn!("跳过 {}: {}", path.display(), error);
                    store.issues.push(ContentIssue { path, error });
                }
            }
        }
        store.posts.sort_by(|a, b| a.source.cmp(&b.source));
        store.issues.sort_by(|a, b| a.path.cmp(&b.path));

        info!("加载了 {} 篇文章，{} 个文件有错误", store.posts.len(), store.issues.len());
        Ok(store)
    }

    /// 给定生成器参数时，构建会输出的文章，按时间从新到旧
    pub fn select(&self, flags: &GeneratorFlags, now: DateTime<Utc>) -> Vec<&Post> {
        let mut selected: Vec<&Post> = self
            .posts
            .iter()
            .filter(|post| flags.admits(post, now))
            .collect();
        selected.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));
        selected
    }
}

/// 收集目录下的内容文件，目录不存在时返回空
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        debug!("目录不存在: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && utils::is_content_file(path) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// 解析一个内容文件
pub fn parse_post(path: &Path, text: &str, draft: bool) -> Result<Post, BlogError> {
    let (kind, slug) = if draft {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| BlogError::InvalidFileName {
                path: path.to_path_buf(),
            })?;
        (PostKind::Draft, slug)
    } else {
        let name = PostFileName::parse(path)?;
        (PostKind::Dated { date: name.date }, name.slug)
    };

    let matter = Matter::<YAML>::new();
    let result = matter.parse(text);
    let data = result.data.ok_or_else(|| BlogError::MissingFrontMatter {
        path: path.to_path_buf(),
    })?;
    let raw: RawFrontMatter = data.deserialize().map_err(|e| BlogError::InvalidFrontMatter {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let date = raw
        .date
        .map(Scalar::into_string)
        .as_deref()
        .map(utils::parse_date)
        .transpose()
        .map_err(|e| BlogError::InvalidFrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut categories = raw.categories.map(|c| c.into_vec()).unwrap_or_default();
    if let Some(category) = raw.category {
        categories.push(category.into_string());
    }

    let front_matter = FrontMatter {
        author: raw.author.map(Scalar::into_string),
        title: raw.title.map(Scalar::into_string),
        date,
        categories,
        tags: raw.tags.map(|t| t.into_vec()).unwrap_or_default(),
        published: raw.published.unwrap_or(true),
        layout: raw.layout,
        extra: raw.extra,
    };

    Ok(Post {
        source: path.to_path_buf(),
        slug,
        kind,
        front_matter,
        body: result.content,
    })
}
