use anyhow::Result;
use blogctl::cli;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = cli::Cli::parse();

    // 初始化日志系统
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    fmt()
        .with_target(false)
        .with_max_level(level)
        .init();

    // 执行命令
    match cli::execute(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Error: {}", e);

            // 打印错误链
            let mut source = e.source();
            while let Some(e) = source {
                error!("Caused by: {}", e);
                source = e.source();
            }

            std::process::exit(1);
        }
    }
}
