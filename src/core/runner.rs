use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, error, info, warn};

use crate::core::dispatch::{Invocation, Plan, StepKind};

/// 外部进程执行器
///
/// 返回进程的退出码。进程无法启动时返回错误。
#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(&mut self, invocation: &Invocation) -> Result<i32>;
}

/// 在站点目录下启动真实进程，继承标准输入输出
pub struct ProcessExecutor {
    /// 工作目录
    pub work_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }
}

impl Executor for ProcessExecutor {
    async fn run(&mut self, invocation: &Invocation) -> Result<i32> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.work_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = command
            .spawn()
            .with_context(|| format!("启动 `{}` 失败", invocation.program))?;

        // 终端的中断信号同样会发给子进程，这里只等待它退出
        let waited = tokio::select! {
            status = child.wait() => status,
            _ = tokio::signal::ctrl_c() => {
                warn!("收到中断信号，等待 `{}` 退出", invocation.program);
                child.wait().await
            }
        };
        let status = waited.with_context(|| format!("等待 `{}` 失败", invocation.program))?;

        Ok(exit_code(status))
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// 单个步骤的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub kind: StepKind,
    pub exit_code: i32,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// 一次计划执行的报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 已执行的步骤
    pub completed: Vec<StepOutcome>,
    /// 因前一步失败而未执行的步骤
    pub skipped: Vec<StepKind>,
}

impl RunReport {
    /// 所有步骤都执行且成功
    pub fn success(&self) -> bool {
        self.skipped.is_empty() && self.completed.iter().all(StepOutcome::success)
    }

    /// 最后一个被执行进程的退出码
    pub fn exit_code(&self) -> i32 {
        self.completed.last().map_or(0, |outcome| outcome.exit_code)
    }
}

/// 按顺序执行计划，遇到第一个失败的步骤即停止
pub struct Runner<E: Executor> {
    executor: E,
}

impl<E: Executor> Runner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn run(&mut self, plan: &Plan) -> Result<RunReport> {
        info!("执行操作 {}", plan.operation.to_string().bright_cyan());
        let mut report = RunReport::default();
        let mut steps = plan.steps.iter();

        for step in steps.by_ref() {
            info!("[{}] {}", step.kind, step.invocation.display_masked(&plan.token_var));
            let exit_code = self
                .executor
                .run(&step.invocation)
                .await
                .with_context(|| format!("{} 的 {} 步骤无法执行", plan.operation, step.kind))?;
            debug!("[{}] 退出码 {}", step.kind, exit_code);

            let outcome = StepOutcome {
                kind: step.kind,
                exit_code,
            };
            let failed = !outcome.success();
            report.completed.push(outcome);
            if failed {
                error!("[{}] 失败，退出码 {}", step.kind, exit_code);
                break;
            }
        }

        report.skipped = steps.map(|step| step.kind).collect();
        for kind in &report.skipped {
            warn!("跳过 [{}]", kind);
        }
        Ok(report)
    }
}
