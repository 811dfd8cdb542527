use anyhow::{Context, Result};
use gatehouse::{
    api::routes::create_router,
    cli::{generate_key, output::Output, Cli, Commands},
    AppState, GatehouseConfig, InMemoryUserStore, TokenService,
};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        None | Some(Commands::Serve) => serve(&cli, &output).await,
        Some(Commands::Config { validate }) => show_config(&cli, &output, validate),
        Some(Commands::Keygen { bytes }) => keygen(bytes),
    }
}

/// Start the HTTP server
async fn serve(cli: &Cli, output: &Output) -> Result<()> {
    let config = GatehouseConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    init_tracing(&config.server.log_level, cli.verbose);

    if cli.verbose {
        output.banner();
    }

    let addr = config.bind_address();
    let state = AppState::new(config, Arc::new(InMemoryUserStore::new()))?;
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Gatehouse listening on http://{}", addr);
    if cli.verbose {
        output.info(&format!("Listening on http://{}", addr));
    }

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing(log_level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Print the effective configuration, never the key itself
fn show_config(cli: &Cli, output: &Output, validate: bool) -> Result<()> {
    let config = GatehouseConfig::read(&cli.config)
        .with_context(|| format!("failed to read {}", cli.config.display()))?;

    output.header("Server");
    output.kv("bind", &config.bind_address());
    output.kv("log_level", &config.server.log_level);

    output.header("Auth");
    let key_source = if config.auth.secret_key.is_some() {
        "inline".to_string()
    } else {
        format!("${}", config.auth.secret_key_env)
    };
    output.kv("secret_key", &key_source);
    output.kv(
        "expiration_millis",
        &config.auth.expiration_millis.to_string(),
    );

    output.header("Public paths");
    for path in &config.auth.public_paths {
        output.list_item(path);
    }

    if !config.auth.role_rules.is_empty() {
        output.header("Role rules");
        for rule in &config.auth.role_rules {
            let roles: Vec<String> = rule.roles.iter().map(ToString::to_string).collect();
            output.list_item(&format!("{} -> {}", rule.pattern, roles.join(", ")));
        }
    }

    if !validate {
        output.hint("Run with --validate to also check the signing key");
        return Ok(());
    }

    println!();
    match config.validate() {
        Ok(()) => output.success("Configuration is valid"),
        Err(e) => {
            output.error(&e.to_string());
            anyhow::bail!("configuration is invalid");
        }
    }

    Ok(())
}

/// Print a fresh key alone on stdout so it can be captured by a shell
fn keygen(bytes: usize) -> Result<()> {
    match generate_key(bytes) {
        Some(key) => {
            println!("{}", key);
            Ok(())
        }
        None => anyhow::bail!(
            "key must be at least {} bytes, got {}",
            TokenService::MIN_KEY_LENGTH,
            bytes
        ),
    }
}
