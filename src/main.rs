//! Process Advisor
//!
//! 入口：加载 .env 与配置、初始化日志、读取流程描述，运行分析 / 优化流水线并输出、保存报告。

use std::sync::Arc;

use anyhow::Context;
use process_advisor::{
    advisor::{AdvisorOutcome, ProcessAdvisor},
    config::{load_config, Provider},
    llm::{LlmClient, MockLlmClient, OpenAiClient},
    observability,
    platform::LocalPlatform,
    report::save_report,
    ui,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    observability::init();

    let cfg = load_config(None).context("Failed to load configuration")?;
    // 配置错误在创建任何资源之前退出
    let settings = cfg.platform_settings()?;

    let llm: Arc<dyn LlmClient> = match &settings.provider {
        Provider::OpenAi { endpoint, api_key } => Arc::new(OpenAiClient::new(
            endpoint,
            &settings.model,
            api_key.as_deref(),
        )),
        Provider::Mock => Arc::new(MockLlmClient),
    };
    let platform = Arc::new(LocalPlatform::new(
        llm.clone(),
        settings.delegation_timeout_secs,
    ));
    let advisor = ProcessAdvisor::new(platform, settings.model.clone());

    ui::clear_screen();
    ui::print_banner();
    let request = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        ui::prompt_request(&mut input).context("Failed to read input")?
    };

    let result = match advisor.run(&request).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Process analysis aborted: {e}");
            return Ok(());
        }
    };

    println!("\n{}", ui::render_outcome(&result.outcome));
    if let AdvisorOutcome::Completed { report, .. } = &result.outcome {
        match save_report(report, &cfg.output.dir) {
            Ok(saved) => println!("\n{}", ui::render_saved(&saved)),
            Err(e) => eprintln!("Failed to save report: {e}"),
        }
    }
    if result.cleanup.attempted() > 0 {
        println!("\n{}", ui::render_cleanup(&result.cleanup));
    }

    let (prompt, completion, total) = llm.token_usage();
    tracing::info!(prompt, completion, total, "Token usage");
    Ok(())
}
