//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ADVISOR__*` 覆盖（双下划线表示嵌套，如 `ADVISOR__PLATFORM__MODEL=gpt-4o`）。
//! 兼容旧变量 `PROJECT_ENDPOINT` / `MODEL_DEPLOYMENT_NAME`（未配置 endpoint / model 时作为回退）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::AdvisorError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub platform: PlatformSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// [platform] 段：后端、端点、模型部署名
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSection {
    /// 后端：openai（任意 OpenAI 兼容端点）/ mock（离线）
    #[serde(default = "default_provider")]
    pub provider: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// 未设置时读取 OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeouts: TimeoutsSection,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            model: None,
            api_key: None,
            timeouts: TimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeoutsSection {
    /// 单次委派调用超时（秒）；未设置时不限时
    #[serde(default)]
    pub delegation_secs: Option<u64>,
}

/// [output] 段：报告输出目录
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

/// 平台后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    OpenAi {
        endpoint: String,
        api_key: Option<String>,
    },
    Mock,
}

/// 校验后的平台设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    pub provider: Provider,
    pub model: String,
    pub delegation_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// 校验连接 / 模型配置；缺失时返回 ConfigError（此时尚未创建任何资源）
    pub fn platform_settings(&self) -> Result<PlatformSettings, AdvisorError> {
        let section = &self.platform;
        let timeout = section.timeouts.delegation_secs;
        match section.provider.to_lowercase().as_str() {
            "mock" => Ok(PlatformSettings {
                provider: Provider::Mock,
                model: section.model.clone().unwrap_or_else(|| "mock".to_string()),
                delegation_timeout_secs: timeout,
            }),
            "openai" => {
                let endpoint = non_empty(section.endpoint.clone())
                    .or_else(|| non_empty(std::env::var("PROJECT_ENDPOINT").ok()))
                    .ok_or_else(|| {
                        AdvisorError::ConfigError(
                            "platform endpoint missing: set platform.endpoint or PROJECT_ENDPOINT"
                                .to_string(),
                        )
                    })?;
                let model = non_empty(section.model.clone())
                    .or_else(|| non_empty(std::env::var("MODEL_DEPLOYMENT_NAME").ok()))
                    .ok_or_else(|| {
                        AdvisorError::ConfigError(
                            "model missing: set platform.model or MODEL_DEPLOYMENT_NAME".to_string(),
                        )
                    })?;
                let api_key = non_empty(section.api_key.clone())
                    .or_else(|| non_empty(std::env::var("OPENAI_API_KEY").ok()));
                Ok(PlatformSettings {
                    provider: Provider::OpenAi { endpoint, api_key },
                    model,
                    delegation_timeout_secs: timeout,
                })
            }
            other => Err(AdvisorError::ConfigError(format!(
                "unknown platform provider '{other}' (expected openai or mock)"
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 从 config 目录加载配置，环境变量 ADVISOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ADVISOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ADVISOR")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
