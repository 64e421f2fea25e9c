use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use snaplink::config::{Config, DatabaseBackend};
use snaplink::error::LinkError;
use snaplink::registry::LinkRegistry;
use snaplink::storage;

#[derive(Parser)]
#[command(name = "snaplink-admin")]
#[command(about = "Snaplink link management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Create {
        /// Target URL (absolute, with scheme and host)
        url: String,
        /// Custom code, 6-8 alphanumeric characters
        #[arg(long)]
        code: Option<String>,
    },
    /// List all links, newest first
    List,
    /// Show one link with its click statistics
    Show {
        code: String,
    },
    /// Delete a link
    Delete {
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    if config.database.backend == DatabaseBackend::Memory || config.database.url.is_none() {
        bail!("snaplink-admin needs a persistent store; set DATABASE_URL");
    }

    let storage = storage::connect(&config.database).await?;
    let registry = LinkRegistry::new(storage, config.code_generation_attempts);
    let origin = config
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", config.server.host, config.server.port));

    match cli.command {
        Commands::Create { url, code } => {
            let link = registry.create_link(Some(url.as_str()), code.as_deref()).await?;
            println!("✓ Created {} -> {}", link.short_url(&origin), link.target_url);
        }
        Commands::List => {
            let links = registry.list_links().await?;
            if links.is_empty() {
                println!("No links found.");
            } else {
                println!("{:<10} {:>8} {:<26} {}", "Code", "Clicks", "Created", "Target");
                println!("{}", "-".repeat(80));
                for link in links {
                    println!(
                        "{:<10} {:>8} {:<26} {}",
                        link.code,
                        link.click_count,
                        link.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        link.target_url
                    );
                }
            }
        }
        Commands::Show { code } => match registry.get_link(&code).await {
            Ok(link) => {
                println!("Code:         {}", link.code);
                println!("Short URL:    {}", link.short_url(&origin));
                println!("Target:       {}", link.target_url);
                println!("Created:      {}", link.created_at.to_rfc3339());
                println!("Clicks:       {}", link.click_count);
                println!(
                    "Last clicked: {}",
                    link.last_clicked_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string())
                );
            }
            Err(LinkError::NotFound) => println!("⚠ No link with code '{}'", code),
            Err(e) => return Err(e.into()),
        },
        Commands::Delete { code } => match registry.delete_link(&code).await {
            Ok(()) => println!("✓ Deleted link '{}'", code),
            Err(LinkError::NotFound) => println!("⚠ No link with code '{}'", code),
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}
