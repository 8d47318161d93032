use std::path::PathBuf;
use thiserror::Error;

/// 博客工具错误类型
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("读取令牌文件失败: {path}")]
    MissingToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("令牌文件为空: {path}")]
    EmptyToken {
        path: PathBuf,
    },

    #[error("操作 {operation} 缺少部署目标配置: {message}")]
    MissingDeployTarget {
        operation: String,
        message: String,
    },

    #[error("前置数据缺失: {path}")]
    MissingFrontMatter {
        path: PathBuf,
    },

    #[error("前置数据解析失败: {path} - {message}")]
    InvalidFrontMatter {
        path: PathBuf,
        message: String,
    },

    #[error("无法解析日期: {value}")]
    InvalidDate {
        value: String,
    },

    #[error("文件名不符合 YYYY-MM-DD-slug 格式: {path}")]
    InvalidFileName {
        path: PathBuf,
    },

    #[error("文章已存在: {path}")]
    PostExists {
        path: PathBuf,
    },

    #[error("配置错误: {message}")]
    ConfigError {
        message: String,
    },
}
