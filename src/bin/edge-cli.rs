use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::redirect::Policy;
use serde_json::{json, Value};

use edge_router::http::request::X_REQUEST_ID;
use edge_router::lifecycle::startup::load_startup_config;
use edge_router::routing::{EdgeRequest, EdgeRouter, Hop, Outcome};
use edge_router::security::headers::{
    LINK, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Inspect edge routing decisions", long_about = None)]
struct Cli {
    /// Config file to take the rules from; defaults apply without one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the outcome for a single request path
    Route {
        path: String,
        /// Route as the production deployment
        #[arg(long)]
        production: bool,
        /// Origin used for the canonical link, e.g. https://example.com
        #[arg(long)]
        origin: Option<String>,
    },
    /// Follow redirects from a path until it settles
    Trace {
        path: String,
        #[arg(long)]
        production: bool,
    },
    /// Send a request to a running edge router without following redirects
    Probe { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Route {
            path,
            production,
            origin,
        } => {
            let config = load_startup_config(cli.config.as_deref())?;
            let router = EdgeRouter::from_site(&config.site);
            let origin = origin.or(config.site.origin);
            let method = reqwest::Method::GET;

            let mut req = EdgeRequest::new(&path, &method, production || config.site.production);
            if let Some(origin) = origin.as_deref() {
                req = req.with_origin(origin);
            }
            print_json(&outcome_json(&router.route(&req)))?;
        }
        Commands::Trace { path, production } => {
            let config = load_startup_config(cli.config.as_deref())?;
            let router = EdgeRouter::from_site(&config.site);
            let production = production || config.site.production;

            match router.trace(&path, &reqwest::Method::GET, production) {
                Ok(hops) => {
                    let settled = hops.last().map_or(path.as_str(), |h| h.to.as_str());
                    print_json(&json!({
                        "start": path,
                        "settled": settled,
                        "hops": hops.iter().map(hop_json).collect::<Vec<_>>(),
                    }))?;
                }
                Err(e) => {
                    print_json(&json!({
                        "start": e.start,
                        "error": e.to_string(),
                        "hops": e.hops.iter().map(hop_json).collect::<Vec<_>>(),
                    }))?;
                    std::process::exit(1);
                }
            }
        }
        Commands::Probe { url } => {
            let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
            let res = client.get(&url).send().await?;

            let headers = res.headers();
            let mut edge = serde_json::Map::new();
            for name in [
                X_CONTENT_TYPE_OPTIONS,
                X_FRAME_OPTIONS,
                X_XSS_PROTECTION,
                REFERRER_POLICY,
                LINK,
                X_REQUEST_ID,
            ] {
                if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
                    edge.insert(name.to_string(), Value::from(value));
                }
            }
            let location = headers
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok());

            print_json(&json!({
                "url": url,
                "status": res.status().as_u16(),
                "location": location,
                "headers": edge,
            }))?;
        }
    }

    Ok(())
}

fn outcome_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Redirect {
            location,
            status,
            rule,
        } => json!({
            "outcome": "redirect",
            "status": status.as_u16(),
            "location": location,
            "rule": rule.as_str(),
        }),
        Outcome::Continue { headers } => {
            let headers: serde_json::Map<String, Value> = headers
                .iter()
                .map(|(name, value)| (name.to_string(), Value::from(value)))
                .collect();
            json!({ "outcome": "continue", "headers": headers })
        }
    }
}

fn hop_json(hop: &Hop) -> Value {
    json!({ "from": hop.from, "to": hop.to, "rule": hop.rule.as_str() })
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
