//! 运行执行器：把一次 Run 从 Created 驱动到终态
//!
//! execute 会一直等待 work 完成（调用方被阻塞），期间不暴露任何中间结果；
//! work 返回 Err 时 Run 进入 Failed 并记录 last_error，不做重试。

use std::future::Future;

use crate::platform::{Run, RunStatus};

pub struct RunExecutor {
    run: Run,
}

impl RunExecutor {
    pub fn new(run: Run) -> Self {
        Self { run }
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    /// 驱动 Run：Queued → InProgress → work → Completed / Failed
    pub async fn execute<F>(mut self, work: F) -> Run
    where
        F: Future<Output = Result<(), String>>,
    {
        for next in [RunStatus::Queued, RunStatus::InProgress] {
            if let Err(e) = self.advance(next) {
                return self.abort(e);
            }
        }

        match work.await {
            Ok(()) => {
                if let Err(e) = self.advance(RunStatus::Completed) {
                    return self.abort(e);
                }
            }
            Err(reason) => {
                tracing::warn!(run = %self.run.id, "Run failed: {}", reason);
                if let Err(e) = self.run.fail(reason) {
                    tracing::error!(run = %self.run.id, "Cannot mark run failed: {}", e);
                }
            }
        }

        self.run
    }

    fn advance(&mut self, next: RunStatus) -> Result<(), String> {
        self.run.transition(next).map_err(|e| e.to_string())?;
        tracing::info!(run = %self.run.id, status = %next, "Run status");
        Ok(())
    }

    /// 状态机内部错误：尽量落到 Failed，已是终态则原样返回
    fn abort(mut self, reason: String) -> Run {
        tracing::error!(run = %self.run.id, "Run state error: {}", reason);
        if !self.run.status.is_terminal() {
            let _ = self.run.fail(reason);
        }
        self.run
    }
}
