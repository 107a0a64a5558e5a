use anyhow::Context;
use bridge::server::HttpBridge;
use clap::Parser;
use eventclass::inference::{AnthropicClient, ApiKey};
use eventclass::prompt::PromptLayout;
use generator::template::example_event;
use log::{error, info};
use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "LLM-assisted particle event classifier")]
struct Args {
    /// Serve POST /analyze_events until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Classify a batch of generated events and print it as JSON
    #[arg(long)]
    count: Option<usize>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Response layout: line-prefix or json
    #[arg(long)]
    layout: Option<PromptLayout>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    max_tokens: Option<u32>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Seed for reproducible event generation
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut WorkflowConfig) {
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if self.seed.is_some() {
            config.generator.seed = self.seed;
        }
        // The single example event is always read back with the line parser.
        if self.single_example() {
            config.layout = PromptLayout::LinePrefix;
        }
    }

    fn single_example(&self) -> bool {
        !self.serve && self.count.is_none()
    }
}

fn or_none<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    args.apply(&mut workflow_config);

    let api_key =
        ApiKey::from_option(args.api_key.clone()).context("ANTHROPIC_API_KEY must be set")?;
    let client = AnthropicClient::new(workflow_config.to_inference_config(api_key))
        .context("building inference client")?;
    let runner = Arc::new(Runner::new(&workflow_config, Arc::new(client)));
    info!(
        "using model {} with {} layout",
        workflow_config.model, workflow_config.layout
    );

    if args.serve {
        let bridge = HttpBridge::new(runner.clone(), workflow_config.model.clone());
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for the HTTP bridge")?;
        runtime.block_on(bridge.serve(workflow_config.bind, async {
            if let Err(err) = signal::ctrl_c().await {
                error!("awaiting Ctrl+C failed: {}", err);
            }
        }))?;
    } else if let Some(count) = args.count {
        let count = NonZeroUsize::new(count).context("--count must be a positive integer")?;
        anyhow::ensure!(
            count.get() <= runner.max_events(),
            "--count must not exceed {} (raise max_events in the workflow config)",
            runner.max_events()
        );
        let rows = runner.run_batch(count);
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("serializing batch")?
        );
    } else {
        match runner.classify(&example_event()) {
            Ok(result) => {
                println!("Event Classification: {}", or_none(result.classification));
                println!("Confidence: {}", or_none(result.confidence));
                println!("Reasoning: {}", or_none(result.reasoning));
            }
            Err(err) => {
                error!("classification failed: {}", err);
                eprintln!("Error interacting with the inference service: {}", err);
            }
        }
    }

    Ok(())
}
