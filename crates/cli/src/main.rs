use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use voltdesk_core::columns::columns_for;
use voltdesk_core::entities::{
    Component, DiePlan, HsrpRequest, RsaRequest, SparePartRequest, User, Vendor, KINDS,
};
use voltdesk_core::{Entity, Record, Uid};
use voltdesk_query::{run_with_debug, Filter, ListQuery};
use voltdesk_server::{AppState, SeedFile};
use voltdesk_store::SharedCollection;

#[derive(Parser, Debug)]
#[command(name = "voltdeskctl", version, about = "voltdesk CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Seed data file (JSON, one array per kind)
    #[arg(long = "seed", global = true, env = "VOLTDESK_SEED")]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the REST server
    Serve {
        /// Listen address
        #[arg(long = "addr", default_value = "127.0.0.1:8600")]
        addr: SocketAddr,
    },
    /// List records of a kind, with search, filter and pagination
    Ls {
        /// Record kind, e.g. "vendors" or "spare-part-requests"
        kind: String,
        /// Free-text search over the kind's default text fields
        #[arg(long = "q", default_value = "")]
        q: String,
        /// Comma-separated search fields (default per kind)
        #[arg(long = "fields")]
        fields: Option<String>,
        /// Equality filter, "field=value" ("all" disables)
        #[arg(long = "filter")]
        filter: Option<String>,
        #[arg(long = "page", default_value_t = 1)]
        page: usize,
        #[arg(long = "page-size", default_value_t = 10)]
        page_size: usize,
        /// Print per-stage match counts to stderr
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// Show one record by uid
    Get {
        /// Record kind
        kind: String,
        /// Record uid
        id: String,
    },
    /// List the known record kinds and their default search fields
    Kinds,
}

fn init_tracing() {
    let env = std::env::var("VOLTDESK_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("VOLTDESK_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid VOLTDESK_METRICS_ADDR; expected host:port");
        }
    }
}

fn load_state(seed: Option<&PathBuf>) -> Result<AppState> {
    let state = AppState::new();
    if let Some(path) = seed {
        let seed = SeedFile::load(path)?;
        info!(records = seed.len(), path = %path.display(), "loading seed data");
        seed.apply(&state);
    }
    Ok(state)
}

fn parse_filter(raw: &str) -> Result<Filter> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok(Filter::new(field, value)),
        _ => bail!("invalid --filter {raw:?}; expected field=value"),
    }
}

fn print_table<T: Record>(kind: &str, items: &[&T]) {
    let cols = columns_for(kind);
    let header: Vec<String> = cols.iter().map(|c| format!("{:w$}", c.label, w = c.width)).collect();
    println!("{}", header.join("  "));
    for item in items {
        let row: Vec<String> = cols
            .iter()
            .map(|c| {
                let cell = item.field(c.field).map(|v| v.render()).unwrap_or_default();
                format!("{:w$}", cell, w = c.width)
            })
            .collect();
        println!("{}", row.join("  "));
    }
}

fn run_ls<T: Entity + Serialize>(
    col: &SharedCollection<T>,
    query: &ListQuery,
    output: Output,
    explain: bool,
) -> Result<()> {
    let snapshot = col.current();
    let (page, debug) = run_with_debug(&snapshot.items, query)?;
    match output {
        Output::Human => {
            print_table(T::KIND, &page.items);
            eprintln!(
                "page {}/{} ({} matching)",
                page.page, page.total_pages, page.total_matching
            );
            if explain {
                eprintln!(
                    "total {} -> filter {} -> search {}",
                    debug.total, debug.after_filter, debug.after_search
                );
            }
        }
        Output::Json => {
            let mut doc = serde_json::json!({
                "items": page.items,
                "total_matching": page.total_matching,
                "total_pages": page.total_pages,
                "page": page.page,
                "page_size": query.page_size,
            });
            if explain {
                doc["debug"] = serde_json::to_value(&debug)?;
            }
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn run_get<T: Entity + Serialize>(col: &SharedCollection<T>, id: &str, output: Output) -> Result<()> {
    let uid: Uid = id.parse().with_context(|| format!("invalid uid {id:?}"))?;
    let Some(rec) = col.get(uid) else { bail!("{}/{} not found", T::KIND, id) };
    match output {
        Output::Human => print_table(T::KIND, &[&rec]),
        Output::Json => println!("{}", serde_json::to_string_pretty(&rec)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr } => {
            let state = load_state(cli.seed.as_ref())?;
            voltdesk_server::serve(addr, state).await?;
        }
        Commands::Ls { kind, q, fields, filter, page, page_size, explain } => {
            let state = load_state(cli.seed.as_ref())?;
            let filter = filter.as_deref().map(parse_filter).transpose()?;
            let make_query = |defaults: &[&str]| ListQuery {
                search_text: q.clone(),
                search_fields: match &fields {
                    Some(csv) => csv
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    None => defaults.iter().map(|s| (*s).to_string()).collect(),
                },
                filter: filter.clone(),
                page,
                page_size,
            };
            match kind.as_str() {
                k if k == Vendor::KIND => {
                    run_ls(&state.vendors, &make_query(Vendor::search_fields()), cli.output, explain)?
                }
                k if k == Component::KIND => run_ls(
                    &state.components,
                    &make_query(Component::search_fields()),
                    cli.output,
                    explain,
                )?,
                k if k == DiePlan::KIND => run_ls(
                    &state.die_plans,
                    &make_query(DiePlan::search_fields()),
                    cli.output,
                    explain,
                )?,
                k if k == SparePartRequest::KIND => run_ls(
                    &state.spare_part_requests,
                    &make_query(SparePartRequest::search_fields()),
                    cli.output,
                    explain,
                )?,
                k if k == HsrpRequest::KIND => run_ls(
                    &state.hsrp_requests,
                    &make_query(HsrpRequest::search_fields()),
                    cli.output,
                    explain,
                )?,
                k if k == RsaRequest::KIND => run_ls(
                    &state.rsa_requests,
                    &make_query(RsaRequest::search_fields()),
                    cli.output,
                    explain,
                )?,
                k if k == User::KIND => {
                    run_ls(&state.users, &make_query(User::search_fields()), cli.output, explain)?
                }
                other => bail!("unknown kind {other:?}; see `voltdeskctl kinds`"),
            }
        }
        Commands::Get { kind, id } => {
            let state = load_state(cli.seed.as_ref())?;
            match kind.as_str() {
                k if k == Vendor::KIND => run_get(&state.vendors, &id, cli.output)?,
                k if k == Component::KIND => run_get(&state.components, &id, cli.output)?,
                k if k == DiePlan::KIND => run_get(&state.die_plans, &id, cli.output)?,
                k if k == SparePartRequest::KIND => {
                    run_get(&state.spare_part_requests, &id, cli.output)?
                }
                k if k == HsrpRequest::KIND => run_get(&state.hsrp_requests, &id, cli.output)?,
                k if k == RsaRequest::KIND => run_get(&state.rsa_requests, &id, cli.output)?,
                k if k == User::KIND => run_get(&state.users, &id, cli.output)?,
                other => bail!("unknown kind {other:?}; see `voltdeskctl kinds`"),
            }
        }
        Commands::Kinds => {
            let kinds: Vec<(&str, &[&str])> = vec![
                (Vendor::KIND, Vendor::search_fields()),
                (Component::KIND, Component::search_fields()),
                (DiePlan::KIND, DiePlan::search_fields()),
                (SparePartRequest::KIND, SparePartRequest::search_fields()),
                (HsrpRequest::KIND, HsrpRequest::search_fields()),
                (RsaRequest::KIND, RsaRequest::search_fields()),
                (User::KIND, User::search_fields()),
            ];
            debug_assert_eq!(kinds.len(), KINDS.len());
            match cli.output {
                Output::Human => {
                    for (kind, fields) in &kinds {
                        println!("{kind}  (search: {})", fields.join(", "));
                    }
                }
                Output::Json => {
                    let doc: serde_json::Map<String, serde_json::Value> = kinds
                        .iter()
                        .map(|(k, fields)| ((*k).to_string(), serde_json::json!(fields)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                }
            }
        }
    }
    Ok(())
}
