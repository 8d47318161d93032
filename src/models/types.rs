use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::BlogError;

/// 支持的内容文件扩展名
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown", "html"];

/// 文章的来源类别
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PostKind {
    /// 位于文章目录，文件名带日期
    Dated {
        date: NaiveDate,
    },
    /// 位于草稿目录，文件名不带日期
    Draft,
}

/// 从文件名解析出的日期和别名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFileName {
    /// 文件名中的日期
    pub date: NaiveDate,
    /// 文件名中的别名
    pub slug: String,
    /// 扩展名
    pub extension: String,
}

impl PostFileName {
    /// 解析 `YYYY-MM-DD-slug.ext` 形式的文件名
    pub fn parse(path: &Path) -> Result<Self, BlogError> {
        let invalid = || BlogError::InvalidFileName {
            path: path.to_path_buf(),
        };

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| CONTENT_EXTENSIONS.contains(ext))
            .ok_or_else(invalid)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;

        // "YYYY-MM-DD-" 共 11 个字节
        if stem.len() < 12 || !stem.is_char_boundary(11) || &stem[10..11] != "-" {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(&stem[..10], "%Y-%m-%d").map_err(|_| invalid())?;
        let slug = &stem[11..];
        if slug.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            date,
            slug: slug.to_string(),
            extension: extension.to_string(),
        })
    }

    /// 生成文件名
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.date.format("%Y-%m-%d"), self.slug, self.extension)
    }
}

/// 文章前置数据
#[derive(Debug, Clone, Serialize)]
pub struct FrontMatter {
    /// 作者
    pub author: Option<String>,
    /// 标题
    pub title: Option<String>,
    /// 发布时间（保留原始时区）
    pub date: Option<DateTime<FixedOffset>>,
    /// 分类
    pub categories: Vec<String>,
    /// 标签
    pub tags: Vec<String>,
    /// 是否发布，缺省为 true
    pub published: bool,
    /// 布局
    pub layout: Option<String>,
    /// 其他自定义字段
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// 前置数据中的标量值，数字和布尔值按文本理解
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

/// 前置数据中的标量或标量列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl StringOrList {
    /// 单个字符串按空白拆分，列表原样保留
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(Scalar::Text(s)) => s.split_whitespace().map(str::to_string).collect(),
            StringOrList::One(other) => vec![other.into_string()],
            StringOrList::Many(list) => list.into_iter().map(Scalar::into_string).collect(),
        }
    }
}

/// 前置数据的原始反序列化结构
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrontMatter {
    pub author: Option<Scalar>,
    pub title: Option<Scalar>,
    pub date: Option<Scalar>,
    pub categories: Option<StringOrList>,
    pub category: Option<Scalar>,
    pub tags: Option<StringOrList>,
    pub published: Option<bool>,
    pub layout: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// 博客文章
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// 源文件路径
    pub source: PathBuf,
    /// 别名
    pub slug: String,
    /// 来源类别
    #[serde(flatten)]
    pub kind: PostKind,
    /// 前置数据
    pub front_matter: FrontMatter,
    /// 正文（Markdown 或 HTML）
    #[serde(skip)]
    pub body: String,
}

impl Post {
    /// 标题，缺失时使用别名
    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or(&self.slug)
    }

    pub fn is_published(&self) -> bool {
        self.front_matter.published
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.kind, PostKind::Draft)
    }

    /// 文件名中的日期，草稿没有
    pub fn file_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            PostKind::Dated { date } => Some(*date),
            PostKind::Draft => None,
        }
    }

    /// 用于排序和未来判定的有效时间
    ///
    /// 优先使用前置数据中的时间；否则取文件名日期的零点（UTC）。
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        if let Some(date) = &self.front_matter.date {
            return Some(date.with_timezone(&Utc));
        }
        self.file_date()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
    }

    /// 前置数据日期与文件名日期是否一致
    ///
    /// 比较的是前置数据按其自身时区书写的日历日期。缺少任一日期时视为一致。
    pub fn date_matches_file_name(&self) -> bool {
        match (self.file_date(), &self.front_matter.date) {
            (Some(file_date), Some(date)) => date.date_naive() == file_date,
            _ => true,
        }
    }

    /// 发布时间晚于 `now`
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.effective_date().map_or(false, |date| date > now)
    }
}
