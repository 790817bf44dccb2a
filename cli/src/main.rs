//! Strand command line: fetch, watch and inspect Stellar account history.

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use strand_history::{
    decode_token_call, display_value, AssetTarget, FetchOutcome, FetchParams,
    FilterParams, HistoryConfig, HistoryStore, HorizonClient, MatchContext, PollParams,
    StrKeyCodec,
};
use strand_types::{xdr::decode_sc_val_base64, Network, ScVal};
use strand_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "strand", about = "Stellar account history viewer", version)]
struct Cli {
    /// Network: "public", "testnet" or "futurenet".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, global = true, env = "STRAND_NETWORK")]
    network: Option<Network>,

    /// Horizon endpoint override.
    #[arg(long, global = true, env = "STRAND_HORIZON_URL")]
    horizon_url: Option<String>,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "STRAND_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "STRAND_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "STRAND_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fetch an account's history once and print it.
    History {
        /// Account public key (G...).
        account: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Pages of operations to follow.
        #[arg(long, env = "STRAND_MAX_PAGES")]
        pages: Option<u32>,
    },
    /// Fetch an account's history and keep it fresh until interrupted.
    Watch {
        account: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Seconds between refreshes.
        #[arg(long, env = "STRAND_POLL_INTERVAL")]
        interval: Option<u64>,
    },
    /// Show how a token identifier is interpreted on the selected network.
    Resolve {
        /// "native", "CODE:ISSUER" or a contract address (C...).
        token: String,
    },
    /// Decode base64 XDR contract values, optionally as a token call.
    Decode {
        /// Interpret the values as arguments of this function.
        #[arg(long)]
        function: Option<String>,
        values: Vec<String>,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Only show operations involving this token.
    #[arg(long)]
    token: Option<String>,
    /// Include tiny incoming XLM payments.
    #[arg(long)]
    show_dust: bool,
}

impl FilterArgs {
    fn params(&self, account: &str) -> FilterParams {
        let params = FilterParams::new(account).hide_dust(!self.show_dust);
        match &self.token {
            Some(token) => params.token(token.clone()),
            None => params,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<HistoryConfig> {
    let mut config = match &cli.config {
        Some(path) => HistoryConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HistoryConfig::default(),
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.horizon_url {
        config.horizon_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = match format {
            LogFormat::Human => "human".into(),
            LogFormat::Json => "json".into(),
        };
    }
    match &cli.command {
        Command::History { pages: Some(pages), .. } => config.max_pages = *pages,
        Command::Watch { interval: Some(secs), .. } => config.poll_interval_secs = *secs,
        _ => {}
    }
    config.validate()?;
    Ok(config)
}

fn print_history(
    store: &HistoryStore,
    json: bool,
    account: &str,
    filter: &FilterArgs,
) -> anyhow::Result<()> {
    let codec = StrKeyCodec;
    let Some(data) = store.filtered_history(&filter.params(account)) else {
        anyhow::bail!("no history cached for {account}");
    };
    if json {
        let value = render::history_json(&data, account, &codec);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::history_text(&data, account, &codec));
    }
    Ok(())
}

fn new_store(config: &HistoryConfig) -> anyhow::Result<HistoryStore> {
    let client = HorizonClient::from_config(config)?;
    Ok(HistoryStore::new(Arc::new(client), Arc::new(StrKeyCodec)))
}

async fn run_history(
    cli: &Cli,
    config: &HistoryConfig,
    account: &str,
    filter: &FilterArgs,
) -> anyhow::Result<()> {
    let store = new_store(config)?;
    match store
        .fetch_account_history(FetchParams::new(account, config.network_details()))
        .await
    {
        FetchOutcome::Updated => print_history(&store, cli.json, account, filter),
        FetchOutcome::Failed(message) => anyhow::bail!("fetch failed: {message}"),
        FetchOutcome::MissingAccount => anyhow::bail!("an account public key is required"),
        FetchOutcome::AlreadyInFlight => anyhow::bail!("fetch already in flight"),
    }
}

async fn run_watch(
    cli: &Cli,
    config: &HistoryConfig,
    account: &str,
    filter: &FilterArgs,
) -> anyhow::Result<()> {
    let store = new_store(config)?;
    let network = config.network_details();
    let mut revisions = store.subscribe();

    if let FetchOutcome::Failed(message) = store
        .fetch_account_history(FetchParams::new(account, network.clone()))
        .await
    {
        tracing::warn!(error = %message, "initial fetch failed, will retry in background");
    } else {
        revisions.borrow_and_update();
        print_history(&store, cli.json, account, filter)?;
    }

    store.start_polling(PollParams::new(account, network).every(config.poll_interval()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                revisions.borrow_and_update();
                if !cli.json {
                    println!("\n--- refreshed ---");
                }
                print_history(&store, cli.json, account, filter)?;
            }
        }
    }

    store.stop_polling();
    Ok(())
}

fn run_resolve(cli: &Cli, config: &HistoryConfig, token: &str) -> anyhow::Result<()> {
    let codec = StrKeyCodec;
    let network = config.network_details();
    let ctx = MatchContext::new(&network, &codec);
    let target = AssetTarget::resolve(token);
    let kind = match &target {
        AssetTarget::Native => "native",
        AssetTarget::Classic { .. } => "classic",
        AssetTarget::Contract { .. } => "contract",
    };
    let contract = target.contract_address(&ctx);

    if cli.json {
        let value = serde_json::json!({
            "kind": kind,
            "canonical_id": target.canonical_id(),
            "network": network.network,
            "contract": contract,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("kind:     {kind}");
        println!("id:       {target}");
        println!("network:  {}", network.network);
        println!("contract: {}", contract.as_deref().unwrap_or("(not derivable)"));
    }
    Ok(())
}

fn run_decode(cli: &Cli, function: Option<&str>, values: &[String]) -> anyhow::Result<()> {
    let codec = StrKeyCodec;
    let decoded: Vec<ScVal> = values
        .iter()
        .enumerate()
        .map(|(i, v)| decode_sc_val_base64(v).with_context(|| format!("value {i}")))
        .collect::<anyhow::Result<_>>()?;

    if let Some(function) = function {
        let result = decode_token_call(function, &decoded, &codec)?;
        if cli.json {
            let value = serde_json::json!({
                "from": result.from,
                "to": result.to,
                "amount": result.amount.map(|a| a.to_string()),
                "token_id": result.token_id,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", render::describe_token_result(&result));
        }
        return Ok(());
    }

    for value in &decoded {
        let text = display_value(value, &codec);
        println!("{}: {}", value.kind().as_str(), text.as_deref().unwrap_or("(void)"));
    }
    Ok(())
}

fn log_format(config: &HistoryConfig) -> LogFormat {
    config.log_format.parse().unwrap_or_default()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(log_format(&config), &config.log_level);

    tracing::debug!(network = %config.network, "configuration loaded");

    match &cli.command {
        Command::History { account, filter, .. } => {
            run_history(&cli, &config, account, filter).await
        }
        Command::Watch { account, filter, .. } => run_watch(&cli, &config, account, filter).await,
        Command::Resolve { token } => run_resolve(&cli, &config, token),
        Command::Decode { function, values } => run_decode(&cli, function.as_deref(), values),
    }
}
