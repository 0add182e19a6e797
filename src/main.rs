use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vitae::{Config, Server};

/// Serve a résumé document through a directory of templates.
#[derive(Parser, Debug)]
#[command(name = "vitae", version, about)]
struct Cli {
    /// Résumé document (YAML or JSON)
    document: Option<PathBuf>,

    /// Directory holding templates and fonts
    template_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// URL the PDF renderer uses to reach this service
    #[arg(long)]
    public_url: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(document) = &self.document {
            overrides.push(("paths.document", document.display().to_string()));
        }
        if let Some(dir) = &self.template_dir {
            overrides.push(("paths.template_dir", dir.display().to_string()));
        }
        if let Some(host) = &self.host {
            overrides.push(("server.host", host.clone()));
        }
        if let Some(port) = self.port {
            overrides.push(("server.port", port.to_string()));
        }
        if let Some(url) = &self.public_url {
            overrides.push(("server.public_url", url.clone()));
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    log::debug!("Configuration: {:?}", config);

    let server = Server::bind(&config)
        .await
        .context("Failed to start server")?;
    server.serve().await?;
    Ok(())
}
