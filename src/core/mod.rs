pub mod check;
pub mod content;
pub mod dispatch;
pub mod runner;
pub mod scaffold;

pub use check::{check, CheckReport, Finding, Severity};
pub use content::{ContentIssue, ContentStore};
pub use dispatch::{GeneratorFlags, Invocation, Operation, Plan, Step, StepKind};
pub use runner::{Executor, ProcessExecutor, RunReport, Runner, StepOutcome};
