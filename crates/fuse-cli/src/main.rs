//! Fuse CLI - deploy lending pools and browse underlying assets.

mod commands;
mod config;

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use fuse_subgraph::{AssetPage, OrderDirection};

use crate::commands::assets::AssetQuery;
use crate::commands::pool::DeployArgs;
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "fuse")]
#[command(about = "Deploy Fuse lending pools and query underlying assets")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to fuse.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query underlying assets from the subgraph
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },

    /// Validate and deploy pools
    Pool {
        #[command(subcommand)]
        command: PoolCommand,
    },
}

#[derive(Subcommand)]
enum AssetsCommand {
    /// List every underlying asset
    All,

    /// List one page of underlying assets
    Page {
        /// Records to skip
        #[arg(long)]
        offset: Option<u32>,

        /// Records to return
        #[arg(long)]
        limit: Option<u32>,

        /// Field to sort by
        #[arg(long)]
        order_by: Option<String>,

        /// Sort direction (asc or desc)
        #[arg(long)]
        order_dir: Option<OrderDirection>,
    },

    /// Find assets by symbol
    Search {
        /// Part of the token symbol
        text: String,
    },

    /// Find assets by token address
    Lookup {
        /// Token addresses
        #[arg(required = true, value_parser = parse_address_arg)]
        addresses: Vec<Address>,
    },
}

#[derive(Subcommand)]
enum PoolCommand {
    /// Check a draft without deploying it
    Validate {
        /// Draft file
        draft: PathBuf,
    },

    /// Deploy a draft, continuing any failed earlier attempt
    Deploy {
        /// Draft file
        draft: PathBuf,

        /// Account to deploy from (overrides chain.deployer)
        #[arg(long, value_parser = parse_address_arg)]
        from: Option<Address>,

        /// Make the next N oracle deployments fail
        #[arg(long, default_value_t = 0)]
        fail_oracle: u32,

        /// Make the next N pool deployments fail
        #[arg(long, default_value_t = 0)]
        fail_pool: u32,
    },

    /// Show the pending deployment for a draft
    Status {
        /// Draft file
        draft: PathBuf,
    },

    /// Discard the pending deployment for a draft
    Abandon {
        /// Draft file
        draft: PathBuf,
    },
}

fn parse_address_arg(raw: &str) -> Result<Address, String> {
    fuse_deploy::parse_address(raw).ok_or_else(|| format!("not a valid address: {raw}"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::load()?,
    };

    match cli.command {
        Commands::Assets { command } => {
            let query = match command {
                AssetsCommand::All => AssetQuery::All,
                AssetsCommand::Page {
                    offset,
                    limit,
                    order_by,
                    order_dir,
                } => AssetQuery::Page(AssetPage {
                    offset,
                    limit,
                    order_by,
                    order_dir,
                }),
                AssetsCommand::Search { text } => AssetQuery::Search(text),
                AssetsCommand::Lookup { addresses } => AssetQuery::Lookup(addresses),
            };
            commands::assets::run(&config.subgraph, query).await?;
        }
        Commands::Pool { command } => match command {
            PoolCommand::Validate { draft } => commands::pool::validate(&draft).await?,
            PoolCommand::Deploy {
                draft,
                from,
                fail_oracle,
                fail_pool,
            } => {
                let args = DeployArgs {
                    draft,
                    from,
                    fail_oracle,
                    fail_pool,
                };
                commands::pool::deploy(&config, args).await?;
            }
            PoolCommand::Status { draft } => commands::pool::status(&config, &draft).await?,
            PoolCommand::Abandon { draft } => commands::pool::abandon(&config, &draft).await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deploy_flags_parse() {
        let cli = Cli::try_parse_from([
            "fuse",
            "pool",
            "deploy",
            "draft.toml",
            "--fail-pool",
            "2",
            "--from",
            "0x1111111111111111111111111111111111111111",
        ])
        .unwrap();

        match cli.command {
            Commands::Pool {
                command:
                    PoolCommand::Deploy {
                        fail_oracle,
                        fail_pool,
                        from,
                        ..
                    },
            } => {
                assert_eq!(fail_oracle, 0);
                assert_eq!(fail_pool, 2);
                assert_eq!(from, Some(Address::repeat_byte(0x11)));
            }
            _ => panic!("expected pool deploy"),
        }
    }

    #[test]
    fn lookup_rejects_bad_addresses() {
        let result = Cli::try_parse_from(["fuse", "assets", "lookup", "0x1234"]);
        assert!(result.is_err());
    }

    #[test]
    fn page_order_direction_parses() {
        let cli = Cli::try_parse_from(["fuse", "assets", "page", "--limit", "5", "--order-dir", "desc"])
            .unwrap();

        match cli.command {
            Commands::Assets {
                command: AssetsCommand::Page { limit, order_dir, .. },
            } => {
                assert_eq!(limit, Some(5));
                assert_eq!(order_dir, Some(OrderDirection::Desc));
            }
            _ => panic!("expected assets page"),
        }
    }
}
