use std::env;
use std::fs;
use std::process::ExitCode;

use lending_api::models::{
    AccountRequest, AccountResponse, LendingProvider, RatesRequest, RatesResponse,
};
use lending_api::{wire, Config, ModelError, ProviderRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "<provider|providers|rates-request|rates-response|account-request|account-response> <file.json>...";

#[derive(Debug, Clone, Copy)]
enum PayloadKind {
    Provider,
    Providers,
    RatesRequest,
    RatesResponse,
    AccountRequest,
    AccountResponse,
}

impl PayloadKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "provider" => Some(PayloadKind::Provider),
            "providers" => Some(PayloadKind::Providers),
            "rates-request" => Some(PayloadKind::RatesRequest),
            "rates-response" => Some(PayloadKind::RatesResponse),
            "account-request" => Some(PayloadKind::AccountRequest),
            "account-response" => Some(PayloadKind::AccountResponse),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lending_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Usage: cargo run --bin lending-api -- rates-response response.json
    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);
    if args.len() < 3 {
        eprintln!("Usage: {} {}", program, USAGE);
        return ExitCode::from(2);
    }

    let Some(kind) = PayloadKind::parse(&args[1]) else {
        eprintln!("Unknown payload kind '{}'", args[1]);
        eprintln!("Usage: {} {}", program, USAGE);
        return ExitCode::from(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let registry = match config.load_registry() {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Failed to load provider catalog: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut failed = 0;
    for path in &args[2..] {
        let result = fs::read_to_string(path)
            .map_err(|e| format!("read error: {}", e))
            .and_then(|contents| {
                validate(kind, &contents, &config, &registry).map_err(|e| e.to_string())
            });

        match result {
            Ok(summary) => tracing::info!("{}: valid {:?} ({})", path, kind, summary),
            Err(e) => {
                tracing::error!("{}: {}", path, e);
                failed += 1;
            }
        }
    }

    tracing::info!(
        "Checked {} files, {} invalid",
        args.len() - 2,
        failed
    );

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("lending-api")
}

/// Decodes `contents` as `kind` and returns a short description of what it holds.
fn validate(
    kind: PayloadKind,
    contents: &str,
    config: &Config,
    registry: &ProviderRegistry,
) -> Result<String, ModelError> {
    let summary = match kind {
        PayloadKind::Provider => {
            let provider: LendingProvider = wire::decode(contents)?;
            format!("{} with {} assets", provider.id(), provider.assets().len())
        }
        PayloadKind::Providers => {
            let providers: Vec<LendingProvider> = wire::decode(contents)?;
            let catalog = ProviderRegistry::new(providers)?;
            format!("{} providers", catalog.len())
        }
        PayloadKind::RatesRequest => {
            let request: RatesRequest = wire::decode(contents)?;
            if request.assets.is_empty() {
                "all assets".to_string()
            } else {
                request.assets.join(",")
            }
        }
        PayloadKind::RatesResponse => {
            let response: RatesResponse = wire::decode(contents)?;
            if config.require_known_provider {
                registry.check_response(&response)?;
            }
            format!("{} quoting {} assets", response.provider(), response.rates().len())
        }
        PayloadKind::AccountRequest => {
            let request: AccountRequest = wire::decode(contents)?;
            request.address().to_string()
        }
        PayloadKind::AccountResponse => {
            let response: AccountResponse = wire::decode(contents)?;
            format!(
                "{} with {} contracts",
                response.contracts.address(),
                response.contracts.contracts().len()
            )
        }
    };

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_name_with_empty_args() {
        assert_eq!(program_name(&[]), "lending-api");
        assert_eq!(program_name(&["/usr/bin/lending".to_string()]), "/usr/bin/lending");
    }

    #[test]
    fn test_validate_rejects_inconsistent_max_apr() {
        let contents = r#"{"provider":"acme","rates":[{"asset":"USDC","term_rates":[{"term":7,"apr":0.9}],"max_apr":99.0}]}"#;
        let err = validate(
            PayloadKind::RatesResponse,
            contents,
            &Config::default(),
            &ProviderRegistry::default(),
        )
        .unwrap_err();
        assert!(err.is_malformed_input());
    }
}
