use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server::config::{AppConfig, CONFIG_FILE};
use server::{create_router, state::AppState};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "buildroulette")]
#[command(about = "Spin a product idea for your next side project", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file
    #[arg(short, long, global = true, env = "BUILDROULETTE_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Port to listen on, overrides [server] port
    #[arg(short, long, global = true, env = "BUILDROULETTE_PORT")]
    port: Option<u16>,

    /// Discord webhook for generation outcomes, overrides [notifications]
    #[arg(long, global = true, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    discord_webhook_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Start the HTTP server (default)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Init { force }) => init_config(&cli.config, *force).await,
        Some(Commands::Config) => print_config(&cli).await,
        Some(Commands::Serve) | None => serve(&cli).await,
    }
}

async fn load_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::read(&cli.config).await;
    apply_overrides(&mut config, cli);
    config
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = &cli.discord_webhook_url {
        config.notifications.discord_webhook_url = Some(url.clone());
    }
}

async fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    AppConfig::default()
        .write(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote default config to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust [pipeline] models and [notifications] as needed");
    println!("  2. Run 'buildroulette' to start the server");

    Ok(())
}

async fn print_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await;
    let content = config
        .to_toml()
        .context("Failed to serialize configuration")?;
    print!("{}", content);
    Ok(())
}

async fn serve(cli: &Cli) -> Result<()> {
    init_tracing();

    let config = load_config(cli).await;
    config
        .pipeline
        .validate()
        .context("Invalid [pipeline] configuration")?;

    tracing::info!("Config: {}", cli.config.display());

    let state = AppState::from_config(&config).context("Failed to build idea pipeline")?;
    let app = create_router(state);

    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    println!();
    println!("BuildRoulette");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "buildroulette=info,server=info,ideation=info,tower_http=info".into()
            }),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_on_top_of_file_config() {
        let cli = Cli::parse_from([
            "buildroulette",
            "--port",
            "9000",
            "--discord-webhook-url",
            "https://discord.com/api/webhooks/1/abc",
            "serve",
        ]);

        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.notifications.discord_webhook_url.as_deref(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["buildroulette"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }
}
