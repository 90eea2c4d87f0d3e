//! Solr Bridge CLI - run bridge queries against a Solr server.
//!
//! This binary wraps the solr-bridge library: it translates a bridge query,
//! prints the select URL it maps to, or runs it as a count, retrieve or
//! search and prints the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use solr_bridge::{BridgeRequest, QueryMethod, SolrAdapter, SolrConfig};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Operation {
    /// Print the search select URL without contacting Solr
    Url,
    /// Number of matching documents
    Count,
    /// The single matching record
    Retrieve,
    /// A page of matching records
    Search,
}

#[derive(Parser, Debug)]
#[command(name = "solr-bridge")]
#[command(about = "Translate bridge queries and run them against Solr")]
struct Args {
    /// Operation to perform
    #[arg(value_enum)]
    operation: Operation,

    /// Solr base URL
    #[arg(long, default_value = "http://localhost:8983/solr")]
    url: String,

    /// Solr core or collection
    #[arg(short, long)]
    structure: String,

    /// Bridge query (lucene template or JSON envelope)
    #[arg(short, long, default_value = "")]
    query: String,

    /// Query parameter as NAME=VALUE (repeatable)
    #[arg(short, long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Field to return (repeatable)
    #[arg(short, long = "field")]
    fields: Vec<String>,

    /// Sort order, e.g. "_timestamp:DESC,message:ASC"
    #[arg(long)]
    order: Option<String>,

    /// Rows per page
    #[arg(long)]
    page_size: Option<String>,

    /// Rows to skip
    #[arg(long)]
    offset: Option<String>,

    /// Basic auth username
    #[arg(long)]
    username: Option<String>,

    /// Basic auth password
    #[arg(long)]
    password: Option<String>,

    /// Skip the core status check before querying
    #[arg(long)]
    skip_check: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    debug: bool,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))
}

impl Args {
    fn bridge_request(&self) -> BridgeRequest {
        let mut request = BridgeRequest::new(&self.structure, &self.query)
            .with_fields(self.fields.iter().cloned());
        for (name, value) in &self.params {
            request = request.with_parameter(name, value);
        }
        if let Some(order) = &self.order {
            request = request.with_metadata("order", order);
        }
        if let Some(page_size) = &self.page_size {
            request = request.with_metadata("pageSize", page_size);
        }
        if let Some(offset) = &self.offset {
            request = request.with_metadata("offset", offset);
        }
        request
    }

    fn solr_config(&self) -> Result<SolrConfig> {
        let mut config = SolrConfig::new(&self.url)?;
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config = config.with_credentials(username, password);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine readable
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let adapter = SolrAdapter::with_reqwest(args.solr_config()?)?;
    let request = args.bridge_request();
    debug!("Bridge request: {:?}", request);

    if args.operation != Operation::Url && !args.skip_check {
        adapter
            .initialize()
            .await
            .context("Solr connection check failed")?;
    }

    info!("Running {:?} against {}", args.operation, args.structure);
    let output = match args.operation {
        Operation::Url => {
            let url = adapter
                .build_url(QueryMethod::Search, &request)
                .context("Failed to build the select URL")?;
            println!("{}", url);
            return Ok(());
        }
        Operation::Count => json!({ "count": adapter.count(&request).await? }),
        Operation::Retrieve => json!({ "record": adapter.retrieve(&request).await? }),
        Operation::Search => serde_json::to_value(adapter.search(&request).await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
