//! `fortidash-probe` -- one-shot FortiManager access check.
//!
//! Authenticates with the configured credentials, reads the admin
//! account's `rpc-permit`, queries devices in each requested ADOM and
//! prints the resulting report as JSON on stdout. Exits non-zero when a
//! blocking problem was found, so it can gate deployments.
//!
//! # Environment variables
//!
//! Accepts everything the API server reads for FortiManager
//! (`FORTIMANAGER_HOST`, `FORTIMANAGER_API_KEY`, ...), plus:
//!
//! | Variable      | Required | Default               | Description                    |
//! |---------------|----------|-----------------------|--------------------------------|
//! | `PROBE_ADOMS` | no       | `FORTIMANAGER_ADOM`   | Comma-separated ADOMs to check |

use std::process::ExitCode;

use fortidash_core::adom::validate_adom_name;
use fortidash_core::config::{ConfigError, EnvReader};
use fortidash_core::error::CoreError;
use fortidash_fortimanager::diagnostics::{run_auth_diagnostics, AuthReport};
use fortidash_fortimanager::{
    FortiManagerApi, FortiManagerClient, FortiManagerConfig, FortiManagerError, MockFortiManager,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    FortiManager(#[from] FortiManagerError),

    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fortidash_probe=info,fortidash_fortimanager=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(report) if report.has_blocking_problem() => {
            tracing::warn!("Probe found blocking problems");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Probe failed");
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<AuthReport, ProbeError> {
    let env = EnvReader::process();
    let config = FortiManagerConfig::from_reader(&env)?;
    let mut adoms = env.list_or("PROBE_ADOMS", &config.adom);
    if adoms.is_empty() {
        adoms.push(config.adom.clone());
    }
    for adom in &adoms {
        validate_adom_name(adom)?;
    }

    let api: Box<dyn FortiManagerApi> = if config.mock_mode {
        tracing::warn!("FORTIMANAGER_MOCK_MODE is on, probing the mock backend");
        Box::new(MockFortiManager::default())
    } else {
        Box::new(FortiManagerClient::new(&config)?)
    };

    tracing::info!(
        endpoint = %config.endpoint(),
        adoms = ?adoms,
        "Probing FortiManager",
    );

    let report = run_auth_diagnostics(api.as_ref(), &adoms).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Err(e) = api.close().await {
        tracing::warn!(error = %e, "FortiManager logout failed");
    }

    for finding in &report.findings {
        tracing::info!(severity = ?finding.severity, "{}", finding.message);
    }
    Ok(report)
}
