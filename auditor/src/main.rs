use std::{io, path::PathBuf};

use alloy::{providers::ProviderBuilder, transports::http::reqwest::Url};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auditor::FailurePolicy;
use candidates::Candidates;
use chain::ChainClient;

mod auditor;
mod bindings;
mod candidates;
mod chain;
mod error;

/// Lists the candidate addresses holding a nonzero nonce on a gateway contract.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address of the deployed gateway contract.
    gateway: Option<String>,

    /// Account address. Required, but not used by the audit.
    account: Option<String>,

    #[arg(long, env = "ETH_RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: Url,

    /// JSON array of candidate addresses, replacing the built-in list.
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Report the candidates that could be queried instead of failing the run.
    #[arg(long)]
    keep_going: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let candidates = Candidates::load(args.candidates.as_deref())?;

    let provider = ProviderBuilder::new().on_http(args.rpc_url);
    let client = ChainClient::new(provider);

    let policy = if args.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::AllOrNothing
    };

    auditor::run_with_args(
        args.gateway,
        args.account,
        &client,
        &candidates,
        policy,
        &mut io::stdout().lock(),
    )
    .await?;

    Ok(())
}
