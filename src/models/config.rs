use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件名
pub const CONFIG_FILE: &str = "blogctl.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 生成器命令（程序及其前置参数）
    pub generator: Vec<String>,
    /// 文章目录
    pub posts_dir: PathBuf,
    /// 草稿目录
    pub drafts_dir: PathBuf,
    /// 生成输出目录
    pub output_dir: PathBuf,
    /// 脚手架目录
    pub scaffold_dir: PathBuf,
    /// API 令牌文件
    pub token_file: PathBuf,
    /// 令牌环境变量名
    pub token_var: String,
    /// 环境名变量名
    pub env_var: String,
    /// 生产环境名
    pub production_env: String,
    /// 同步命令（程序及其前置参数）
    pub sync: Vec<String>,
    /// 新文章默认作者
    pub author: Option<String>,
    /// 部署配置
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// 预览部署目标
    pub preview: Option<DeployTarget>,
}

/// 远程存储部署目标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployTarget {
    /// 存储桶
    pub bucket: String,
    /// 访问凭证 profile
    pub profile: String,
    /// 存储桶内前缀
    #[serde(default)]
    pub prefix: Option<String>,
    /// 是否删除远端多余文件
    #[serde(default)]
    pub delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: vec!["bundle".to_string(), "exec".to_string(), "jekyll".to_string()],
            posts_dir: PathBuf::from("_posts"),
            drafts_dir: PathBuf::from("_drafts"),
            output_dir: PathBuf::from("_site"),
            scaffold_dir: PathBuf::from("scaffolds"),
            token_file: PathBuf::from(".github_token"),
            token_var: "JEKYLL_GITHUB_TOKEN".to_string(),
            env_var: "JEKYLL_ENV".to_string(),
            production_env: "production".to_string(),
            sync: vec!["aws".to_string(), "s3".to_string(), "sync".to_string()],
            author: None,
            deploy: DeployConfig::default(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 加载站点目录下的配置，文件不存在时使用默认配置
    pub fn load(site_dir: &Path) -> Result<Self> {
        let path = site_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
