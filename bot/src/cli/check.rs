//! One-shot check command

use crate::health::HealthProber;
use clap::Args;
use downdetector_common::config::MonitorConfig;
use downdetector_common::error::{BotResult, CommonError};
use downdetector_common::types::ProbeResult;
use std::path::Path;
use std::time::Duration;

/// Arguments for the check subcommand
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// URL to probe (overrides the configured target)
    #[arg(long)]
    pub url: Option<String>,

    /// Probe timeout in seconds (overrides the configured timeout)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Probe once and print the result as JSON.
///
/// Returns whether the target was online.
pub async fn execute(args: &CheckArgs, config_path: Option<&Path>) -> BotResult<bool> {
    let mut config = MonitorConfig::load(config_path)?;
    if let Some(url) = &args.url {
        config.target_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.probe_timeout_secs = timeout;
    }
    config.validate()?;

    let result = probe_once(&config).await?;
    let json = serde_json::to_string_pretty(&result).map_err(CommonError::from)?;
    println!("{}", json);

    Ok(result.is_online())
}

async fn probe_once(config: &MonitorConfig) -> BotResult<ProbeResult> {
    let prober = HealthProber::new()?;
    Ok(prober
        .probe(
            &config.target_url,
            Duration::from_secs(config.probe_timeout_secs),
        )
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    #[serial]
    async fn test_check_reports_online() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let args = CheckArgs {
            url: Some(server.uri()),
            timeout: Some(2),
        };
        assert!(execute(&args, None).await.unwrap());
    }

    #[tokio::test]
    #[serial]
    async fn test_check_rejects_zero_timeout() {
        let args = CheckArgs {
            url: Some("http://127.0.0.1:9".to_string()),
            timeout: Some(0),
        };
        assert!(execute(&args, None).await.is_err());
    }
}
