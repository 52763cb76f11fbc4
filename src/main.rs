use std::{env, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;
use tokio::net::TcpListener;
use tuner::{KnobKind, ParameterSet, View, Workbench, configs::TunerConfig};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

#[derive(Parser)]
#[command(name = "charges-dashboard")]
#[command(about = "Hyperparameter dashboard for the insurance charges regressor", long_about = None)]
struct Cli {
    /// JSON tuner configuration; defaults are used when absent
    #[arg(short, long, global = true, env = "TUNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to, falls back to $HOST
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, falls back to $PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the snapped series and metrics of one parameter tuple
    Predict {
        #[arg(long)]
        n_estimators: f64,

        #[arg(long)]
        learning_rate: f64,

        #[arg(long)]
        max_depth: f64,

        #[arg(long)]
        min_samples_split: Option<f64>,

        #[arg(long)]
        subsample: Option<f64>,
    },

    /// Print every cached tuple together with the best configuration
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TunerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TunerConfig::default(),
    };

    let workbench = tuner::prepare(config).context("failed to prepare the prediction cache")?;

    match cli.command {
        Commands::Serve { host, port } => serve(workbench, host, port).await,
        Commands::Predict {
            n_estimators,
            learning_rate,
            max_depth,
            min_samples_split,
            subsample,
        } => {
            let mut params = ParameterSet::new(n_estimators, learning_rate, max_depth);
            if let Some(v) = min_samples_split {
                params = params.with(KnobKind::MinSamplesSplit, v);
            }
            if let Some(v) = subsample {
                params = params.with(KnobKind::Subsample, v);
            }
            predict(&workbench, params)
        }
        Commands::Sweep => {
            let out = json!({
                "predictions": workbench.cache().as_ref(),
                "bestConfig": workbench.best(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

async fn serve(
    workbench: Workbench,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host
        .or_else(|| env::var("HOST").ok())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match port {
        Some(port) => port,
        None => match env::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("invalid PORT {port:?}"))?,
            Err(_) => DEFAULT_PORT,
        },
    };

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    server::serve(listener, Arc::new(workbench)).await?;
    info!("wrapping up");
    Ok(())
}

fn predict(workbench: &Workbench, params: ParameterSet) -> anyhow::Result<()> {
    let store = workbench.store(params);

    let out = match store.view()? {
        View::Ready { key, entry } => json!({
            "key": key,
            "optimal": store.is_optimal(),
            "predictions": entry.predictions,
            "metrics": entry.metrics,
        }),
        View::NotFound { key } => bail!("no cached prediction for {key}"),
        View::Loading => bail!("prediction cache is not loaded"),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
