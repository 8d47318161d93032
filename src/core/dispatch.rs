use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::BlogError;
use crate::models::{Config, DeployTarget, Post};

/// 包含未发布文章的生成器参数
pub const FLAG_UNPUBLISHED: &str = "--unpublished";
/// 包含未来日期文章的生成器参数
pub const FLAG_FUTURE: &str = "--future";
/// 包含草稿的生成器参数
pub const FLAG_DRAFTS: &str = "--drafts";

/// 命名操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// 本地预览，包含全部内容
    Serve,
    /// 以生产环境本地预览，只包含已发布内容
    ServeProd,
    /// 生产构建
    Build,
    /// 预览构建
    BuildPreview,
    /// 预览构建后同步到远程存储
    DeployPreview,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Serve => "serve",
            Operation::ServeProd => "serve-prod",
            Operation::Build => "build",
            Operation::BuildPreview => "build-preview",
            Operation::DeployPreview => "deploy-preview",
        }
    }

    /// 生成器子命令
    pub fn generator_command(&self) -> &'static str {
        match self {
            Operation::Serve | Operation::ServeProd => "serve",
            Operation::Build | Operation::BuildPreview | Operation::DeployPreview => "build",
        }
    }

    /// 生成器内容参数
    pub fn flags(&self) -> GeneratorFlags {
        match self {
            Operation::Serve | Operation::BuildPreview | Operation::DeployPreview => GeneratorFlags::preview(),
            Operation::ServeProd | Operation::Build => GeneratorFlags::published(),
        }
    }

    /// 是否设置生产环境名
    pub fn is_production(&self) -> bool {
        matches!(self, Operation::ServeProd)
    }

    /// 是否在构建后同步
    pub fn syncs(&self) -> bool {
        matches!(self, Operation::DeployPreview)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 生成器的内容选择参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorFlags {
    /// 包含 `published: false` 的文章
    pub unpublished: bool,
    /// 包含未来日期的文章
    pub future: bool,
    /// 包含草稿
    pub drafts: bool,
}

impl GeneratorFlags {
    /// 只包含已发布内容
    pub fn published() -> Self {
        Self::default()
    }

    /// 预览：包含全部内容
    pub fn preview() -> Self {
        Self {
            unpublished: true,
            future: true,
            drafts: true,
        }
    }

    pub fn args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.unpublished {
            args.push(FLAG_UNPUBLISHED);
        }
        if self.future {
            args.push(FLAG_FUTURE);
        }
        if self.drafts {
            args.push(FLAG_DRAFTS);
        }
        args
    }

    /// 使用这些参数构建时，文章是否会被输出
    pub fn admits(&self, post: &Post, now: DateTime<Utc>) -> bool {
        (self.unpublished || post.is_published())
            && (self.future || !post.is_future(now))
            && (self.drafts || !post.is_draft())
    }
}

/// 一次外部进程调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// 程序
    pub program: String,
    /// 参数
    pub args: Vec<String>,
    /// 环境变量
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// 由命令前缀构造，前缀的第一项为程序
    fn from_prefix(prefix: &[String]) -> Result<Self, BlogError> {
        let (program, args) = prefix.split_first().ok_or_else(|| BlogError::ConfigError {
            message: "命令不能为空".to_string(),
        })?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            env: Vec::new(),
        })
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// shell 风格的展示，`secret` 对应的环境变量值被遮蔽
    pub fn display_masked(&self, secret: &str) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.env {
            let value = if key == secret { "***" } else { value.as_str() };
            parts.push(format!("{}={}", key, shell_quote(value)));
        }
        parts.push(shell_quote(&self.program));
        parts.extend(self.args.iter().map(|arg| shell_quote(arg)));
        parts.join(" ")
    }
}

fn shell_quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,".contains(c)) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// 计划中的步骤类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Generate,
    Sync,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Generate => f.write_str("generate"),
            StepKind::Sync => f.write_str("sync"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub invocation: Invocation,
}

/// 一个操作展开后的调用序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub operation: Operation,
    pub steps: Vec<Step>,
    /// 令牌变量名，用于展示时遮蔽
    pub token_var: String,
}

impl Plan {
    /// 将操作展开为调用序列
    pub fn build(operation: Operation, config: &Config, token: &str) -> Result<Self, BlogError> {
        let mut generate = Invocation::from_prefix(&config.generator)?;
        generate.args.push(operation.generator_command().to_string());
        generate
            .args
            .extend(operation.flags().args().into_iter().map(str::to_string));
        if operation.is_production() {
            generate
                .env
                .push((config.env_var.clone(), config.production_env.clone()));
        }
        generate.env.push((config.token_var.clone(), token.to_string()));

        let mut steps = vec![Step {
            kind: StepKind::Generate,
            invocation: generate,
        }];

        if operation.syncs() {
            let target = config.deploy.preview.as_ref().ok_or_else(|| BlogError::MissingDeployTarget {
                operation: operation.to_string(),
                message: "需要 deploy.preview.bucket 和 deploy.preview.profile".to_string(),
            })?;
            steps.push(Step {
                kind: StepKind::Sync,
                invocation: sync_invocation(operation, config, target)?,
            });
        }

        Ok(Self {
            operation,
            steps,
            token_var: config.token_var.clone(),
        })
    }

    /// 每个步骤一行的展示文本
    pub fn lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| step.invocation.display_masked(&self.token_var))
            .collect()
    }
}

fn sync_invocation(operation: Operation, config: &Config, target: &DeployTarget) -> Result<Invocation, BlogError> {
    let mut sync = Invocation::from_prefix(&config.sync)?;
    sync.args.push(config.output_dir.display().to_string());
    sync.args.push(destination(target).map_err(|e| BlogError::MissingDeployTarget {
        operation: operation.to_string(),
        message: format!("{:#}", e),
    })?);
    sync.args.push("--profile".to_string());
    sync.args.push(target.profile.clone());
    if target.delete {
        sync.args.push("--delete".to_string());
    }
    Ok(sync)
}

/// 同步目的地：`s3://<bucket>/<prefix>`
pub fn destination(target: &DeployTarget) -> Result<String> {
    let bucket = target.bucket.trim();
    if bucket.is_empty() || bucket.contains('/') {
        anyhow::bail!("无效的存储桶: {:?}", target.bucket);
    }
    let mut url = Url::parse(&format!("s3://{}/", bucket))
        .with_context(|| format!("无效的存储桶: {:?}", target.bucket))?;
    if let Some(prefix) = target.prefix.as_deref().map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        url.set_path(&format!("/{}/", prefix));
    }
    Ok(url.to_string())
}

/// 相对站点目录读取令牌文件
pub fn read_token(config: &Config, site_dir: &Path) -> Result<String, BlogError> {
    let path = site_dir.join(&config.token_file);
    let token = std::fs::read_to_string(&path).map_err(|source| BlogError::MissingToken {
        path: path.clone(),
        source,
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(BlogError::EmptyToken { path });
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deploy_preview_syncs() {
        for op in [Operation::Serve, Operation::ServeProd, Operation::Build, Operation::BuildPreview] {
            assert!(!op.syncs(), "{}", op);
        }
        assert!(Operation::DeployPreview.syncs());
        assert_eq!(Operation::DeployPreview.generator_command(), "build");
    }

    #[test]
    fn destination_with_prefix() {
        let target = DeployTarget {
            bucket: "preview.example.com".to_string(),
            profile: "blog".to_string(),
            prefix: Some("/drafts/".to_string()),
            delete: false,
        };
        assert_eq!(destination(&target).unwrap(), "s3://preview.example.com/drafts/");
    }

    #[test]
    fn destination_rejects_bad_bucket() {
        let target = DeployTarget {
            bucket: "a/b".to_string(),
            profile: "blog".to_string(),
            prefix: None,
            delete: false,
        };
        assert!(destination(&target).is_err());
    }

    #[test]
    fn masks_token_and_quotes() {
        let inv = Invocation {
            program: "jekyll".to_string(),
            args: vec!["build".to_string(), "my dir".to_string()],
            env: vec![("TOKEN".to_string(), "s3cret".to_string())],
        };
        assert_eq!(inv.display_masked("TOKEN"), "TOKEN='***' jekyll build 'my dir'");
    }
}
