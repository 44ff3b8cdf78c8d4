// # defined - Define Web Daemon
//
// The daemon is a THIN integration layer. It is responsible for:
// 1. Registering the providers compiled into this binary
// 2. Building the command line from what those providers contribute
// 3. Resolving the configuration (defaults < file < flags)
// 4. Finalizing the registry and selecting the preferred provider
// 5. Serving the HTML front-end until SIGINT/SIGTERM
//
// Any failure before step 5 exits with status 1.
//
// ## Configuration
//
// - `--config` / `DEFINE_CONFIG`: JSON configuration file (default: /dev/null)
// - `--preferred-source` / `DEFINE_PREFERRED_SOURCE`: provider key (default: oxford)
// - `--port` / `PORT`: port to listen on (default: 8080)
// - `--log-level` / `DEFINE_LOG_LEVEL`: trace, debug, info, warn, error
// - `--<provider>-<field>` / `DEFINE_<PROVIDER>_<FIELD>`: provider settings
//
// ## Example
//
// ```bash
// export DEFINE_WEBSTER_API_KEY=your_key
// defined --preferred-source webster --port 8080
// ```
//
// ```json
// {
//   "preferred_source": "oxford",
//   "providers": {
//     "oxford": { "app-id": "...", "app-key": "..." }
//   }
// }
// ```

mod cli;
mod web;

use anyhow::{Context, Result};
use cli::Cli;
use define_core::{ConfigSurface, DefineConfig, ProviderRegistry, Source, resolve};
use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Provider used when neither the file nor the flags name one
const DEFAULT_PREFERRED_SOURCE: &str = "oxford";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DefineExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DefineExitCode> for ExitCode {
    fn from(code: DefineExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Register every provider compiled into this binary
#[cfg_attr(
    not(any(feature = "oxford", feature = "webster")),
    allow(unused_variables)
)]
fn register_providers(registry: &mut ProviderRegistry) -> define_core::Result<()> {
    #[cfg(feature = "oxford")]
    define_source_oxford::register(registry)?;

    #[cfg(feature = "webster")]
    define_source_webster::register(registry)?;

    Ok(())
}

fn main() -> ExitCode {
    let mut registry = ProviderRegistry::new();
    if let Err(e) = register_providers(&mut registry) {
        eprintln!("Provider registration error: {}", e);
        return DefineExitCode::ConfigError.into();
    }

    let mut surface = ConfigSurface::new();
    let providers = match registry.configure(&mut surface) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DefineExitCode::ConfigError.into();
        }
    };

    let matches = match cli::command(&surface).try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                DefineExitCode::ConfigError.into()
            } else {
                DefineExitCode::CleanShutdown.into()
            };
        }
    };
    let cli = Cli::from_matches(&matches, &surface);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DefineExitCode::ConfigError.into();
    }

    let config = match resolve(
        &cli.overrides,
        providers,
        &cli.config_path,
        DefineConfig::new(DEFAULT_PREFERRED_SOURCE),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DefineExitCode::ConfigError.into();
        }
    };

    let registry = match registry.finalize(&config) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Provider configuration error: {}", e);
            return DefineExitCode::ConfigError.into();
        }
    };

    let source = match registry.provide_preferred(&config.preferred_source) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            return DefineExitCode::ConfigError.into();
        }
    };

    info!(
        provider = source.name(),
        available = ?registry.keys(),
        "Preferred provider selected"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DefineExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = serve(source, cli.port).await {
            error!("Server error: {:#}", e);
            DefineExitCode::RuntimeError
        } else {
            DefineExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Serve the front-end on `port` until a shutdown signal arrives
async fn serve(source: Arc<dyn Source>, port: u16) -> Result<()> {
    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Listening");

    axum::serve(listener, web::router(source))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Resolve once SIGTERM or SIGINT arrives
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to setup signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", signal);
}

/// Resolve once CTRL-C arrives
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending().await
        }
    }
}
