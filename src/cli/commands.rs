use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{check, ContentStore, GeneratorFlags, Operation, Plan, ProcessExecutor, Runner};
use crate::core::dispatch::read_token;
use crate::core::scaffold;
use crate::models::Config;
use crate::utils;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 指定站点目录
    #[arg(short, long, default_value = ".", global = true)]
    pub path: PathBuf,

    /// 只打印将要执行的命令
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 本地预览，包含未发布、未来日期和草稿
    Serve,

    /// 以生产环境本地预览，只包含已发布内容
    ServeProd,

    /// 生产构建
    Build,

    /// 预览构建，包含未发布、未来日期和草稿
    BuildPreview,

    /// 预览构建并同步到预览存储桶
    DeployPreview,

    /// 检查文章的前置数据和文件名
    Check,

    /// 创建新的草稿文章
    New(NewArgs),

    /// 发布文章
    Publish(PublishArgs),

    /// 列出构建会包含的文章
    List(ListArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// 文章标题
    pub title: String,

    /// 发布日期，默认当前时间
    #[arg(short, long)]
    pub date: Option<String>,
}

#[derive(Args)]
pub struct PublishArgs {
    /// 文章文件
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    /// 按预览构建列出
    #[arg(long)]
    pub preview: bool,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 执行命令，返回进程退出码
pub async fn execute(cli: Cli) -> Result<i32> {
    let site_path = cli.path.clone();
    let config = Config::load(&site_path)?;

    let dry_run = cli.dry_run;

    match cli.command {
        Commands::Serve => run_operation(Operation::Serve, &config, &site_path, dry_run).await,
        Commands::ServeProd => run_operation(Operation::ServeProd, &config, &site_path, dry_run).await,
        Commands::Build => run_operation(Operation::Build, &config, &site_path, dry_run).await,
        Commands::BuildPreview => run_operation(Operation::BuildPreview, &config, &site_path, dry_run).await,
        Commands::DeployPreview => run_operation(Operation::DeployPreview, &config, &site_path, dry_run).await,
        Commands::Check => {
            let store = ContentStore::load(&config, &site_path)?;
            let report = check(&store);
            for finding in &report.findings {
                println!("{}", finding);
            }
            println!(
                "检查了 {} 个文件: {} 个错误, {} 个警告",
                report.files,
                report.errors().to_string().red(),
                report.warnings().to_string().yellow()
            );
            Ok(if report.has_errors() { 1 } else { 0 })
        }
        Commands::New(args) => {
            let date = match args.date.as_deref() {
                Some(value) => utils::parse_date(value)?,
                None => {
                    let now = Local::now();
                    now.with_timezone(now.offset())
                }
            };
            if dry_run {
                println!("new {:?} {}", args.title, utils::format_date(&date));
                return Ok(0);
            }
            let path = scaffold::new_post(&config, &site_path, &args.title, date)?;
            println!("{} {}", "Created".green(), path.display());
            Ok(0)
        }
        Commands::Publish(args) => {
            let file = resolve(&site_path, &args.file);
            if dry_run {
                println!("publish {}", file.display());
                return Ok(0);
            }
            if scaffold::publish(&file)? {
                println!("{} {}", "Published".green(), file.display());
            } else {
                println!("{} 已经是发布状态", file.display());
            }
            Ok(0)
        }
        Commands::List(args) => {
            let store = ContentStore::load(&config, &site_path)?;
            let flags = if args.preview {
                GeneratorFlags::preview()
            } else {
                GeneratorFlags::published()
            };
            let posts = store.select(&flags, utils::now());
            if args.json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                for post in &posts {
                    let date = post
                        .effective_date()
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "draft".to_string());
                    let status = if post.is_draft() {
                        "draft".blue()
                    } else if post.is_published() {
                        "published".green()
                    } else {
                        "unpublished".yellow()
                    };
                    println!("{}  {:<11}  {}", date, status, post.title());
                }
                println!("共 {} 篇", posts.len());
            }
            Ok(0)
        }
    }
}

/// 读取令牌，展开并执行命名操作
async fn run_operation(operation: Operation, config: &Config, site_path: &Path, dry_run: bool) -> Result<i32> {
    let token = read_token(config, site_path)?;
    let plan = Plan::build(operation, config, &token)?;

    if dry_run {
        for line in plan.lines() {
            println!("{}", line);
        }
        return Ok(0);
    }

    let mut runner = Runner::new(ProcessExecutor::new(site_path.to_path_buf()));
    let report = runner.run(&plan).await?;
    if report.success() {
        info!("{} {}", operation.to_string().bright_cyan(), "完成".green());
    } else {
        println!("{} {}", operation.to_string().bright_cyan(), "失败".red());
    }
    Ok(report.exit_code())
}

fn resolve(site_path: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() || file.exists() {
        file.to_path_buf()
    } else {
        site_path.join(file)
    }
}
