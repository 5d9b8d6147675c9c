//! src/main.rs
use anyhow::Context;
use clap::{Parser, Subcommand};
use mini_mapreduce::configuration::{Settings, get_configuration};
use mini_mapreduce::counts::WordCounts;
use mini_mapreduce::driver::Driver;
use mini_mapreduce::reference::ObjectRef;
use mini_mapreduce::startup::{Application, build_store};
use mini_mapreduce::storage::ObjectStore;
use mini_mapreduce::telemetry::init_tracing;
use mini_mapreduce::verify::verify;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(about = "Distributed word count over an object store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the split, map and reduce stages over RPC.
    Serve,
    /// Run one job against a running service and print its report.
    Run {
        /// Source object, e.g. s3://bucket/book.txt
        #[arg(short, long)]
        source: String,
        #[arg(short, long, default_value_t = 3)]
        chunks: i64,
        /// Service address; defaults to the configured rpc host and port.
        #[arg(short, long)]
        address: Option<SocketAddr>,
        /// Recount the source locally and compare it with the result.
        #[arg(long)]
        verify: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;
    let tracer_provider = init_tracing("mini-mapreduce", configuration.telemetry.otlp)?;

    let outcome = match cli.command {
        Command::Serve => serve(configuration).await,
        Command::Run {
            source,
            chunks,
            address,
            verify,
        } => run(configuration, &source, chunks, address, verify).await,
    };

    if let Some(provider) = tracer_provider {
        provider.shutdown().ok();
    }
    outcome
}

async fn serve(configuration: Settings) -> anyhow::Result<()> {
    let application = Application::build(configuration).await?;
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    application.shutdown().await
}

async fn run(
    configuration: Settings,
    source: &str,
    chunks: i64,
    address: Option<SocketAddr>,
    check: bool,
) -> anyhow::Result<()> {
    let address = match address {
        Some(address) => address,
        None => configuration.rpc.address()?,
    };
    let driver = Driver::connect(address, configuration.pipeline.request_timeout()).await?;
    let report = driver.run(source, chunks).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if check {
        let store = build_store(&configuration);
        let source_ref = ObjectRef::parse(source)?;
        let result_ref = ObjectRef::parse(&report.result_ref)?;
        let text = store.get(source_ref.bucket(), source_ref.key()).await?;
        let result = store.get(result_ref.bucket(), result_ref.key()).await?;
        let result = WordCounts::from_json(&result).context("Result is not a word count mapping")?;
        let verification = verify(&String::from_utf8_lossy(&text), &result);
        println!("{}", serde_json::to_string_pretty(&verification)?);
        if !verification.is_consistent() {
            anyhow::bail!("Result counts words the source does not contain");
        }
        if !verification.is_exact() {
            tracing::warn!(
                missing = verification.missing.total(),
                "Words crossing chunk boundaries were dropped"
            );
        }
    }
    Ok(())
}
