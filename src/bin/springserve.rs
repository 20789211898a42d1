//! SpringServe API CLI binary.
//!
//! A command-line interface for interacting with the SpringServe API.

use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use springserve::cli::{Cli, Command, Entity, ReportKind};
use springserve::output::{resource_table, PrettyPrint};
use springserve::{
    PollConfig, QueryParams, ReportParams, ReportingService, Response, SpringServeClient,
    SpringServeError,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("springserve=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let client = match connect(&cli).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set SPRINGSERVE_API_TOKEN, or SPRINGSERVE_EMAIL and SPRINGSERVE_PASSWORD");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn connect(cli: &Cli) -> springserve::Result<SpringServeClient> {
    if let Some(token) = &cli.token {
        return SpringServeClient::new(token, &cli.api_url);
    }
    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            SpringServeClient::login(email, password, &cli.api_url).await
        }
        _ => Err(SpringServeError::ConfigMissing(
            "no API token or login credentials".to_string(),
        )),
    }
}

async fn run(client: &SpringServeClient, cli: Cli) -> springserve::Result<()> {
    match cli.command {
        Command::Get { entity, id, query } => {
            handle_get(client, entity, id.as_deref(), query, cli.json).await
        }
        Command::Update { entity, id, set } => {
            handle_update(client, entity, &id, set, cli.json).await
        }
        Command::Create { entity, set } => handle_create(client, entity, set, cli.json).await,
        Command::Report {
            kind,
            start_date,
            end_date,
            interval,
            dimensions,
            account_id,
            params,
            all_pages,
            max_polls,
        } => {
            let mut report = ReportParams::new().dimensions(dimensions);
            if let Some(start) = start_date {
                report = report.start_date(start);
            }
            if let Some(end) = end_date {
                report = report.end_date(end);
            }
            if let Some(interval) = interval {
                report = report.interval(interval);
            }
            if let Some(account_id) = account_id {
                report = report.account_id(account_id);
            }
            for (key, value) in params {
                report = report.param(key, value);
            }
            handle_report(client, kind, &report, all_pages, max_polls, cli.json).await
        }
    }
}

async fn handle_get(
    client: &SpringServeClient,
    entity: Entity,
    id: Option<&str>,
    query: Vec<(String, String)>,
    json: bool,
) -> springserve::Result<()> {
    let query: QueryParams = query.into_iter().collect();
    let response = client.service(entity.api_name()).get(id, &query).await?;
    output_response(response, json).await
}

async fn handle_update(
    client: &SpringServeClient,
    entity: Entity,
    id: &str,
    fields: Vec<(String, Value)>,
    json: bool,
) -> springserve::Result<()> {
    let response = client
        .service(entity.api_name())
        .get(Some(id), &QueryParams::new())
        .await?;
    ensure_ok(&response)?;

    let mut object = response.into_single()?;
    for (key, value) in fields {
        object.set(&key, value)?;
    }
    let saved = object.save().await?;
    output_response(saved, json).await
}

async fn handle_create(
    client: &SpringServeClient,
    entity: Entity,
    fields: Vec<(String, Value)>,
    json: bool,
) -> springserve::Result<()> {
    let body: Map<String, Value> = fields.into_iter().collect();
    let response = client
        .service(entity.api_name())
        .create(&body, None, &QueryParams::new())
        .await?;
    output_response(response, json).await
}

async fn handle_report(
    client: &SpringServeClient,
    kind: ReportKind,
    params: &ReportParams,
    all_pages: bool,
    max_polls: Option<u32>,
    json: bool,
) -> springserve::Result<()> {
    let mut poll = PollConfig::default();
    if let Some(max) = max_polls {
        poll = poll.with_max_attempts(max);
    }
    let service: ReportingService = match kind {
        ReportKind::Standard => client.reports(),
        ReportKind::TrafficQuality => client.traffic_quality_reports(),
    };

    let mut report = service.with_poll_config(poll).run(params).await?;
    let frame = if all_pages {
        report.get_all_pages().await?
    } else {
        report.to_dataframe()
    };

    if json {
        print_json(frame.rows())
    } else {
        println!("{}", frame.pretty_print());
        Ok(())
    }
}

async fn output_response(response: Response, json: bool) -> springserve::Result<()> {
    ensure_ok(&response)?;
    match response {
        Response::Single(object) => {
            if json {
                print_json(&object)
            } else {
                println!("{}", object.pretty_print());
                Ok(())
            }
        }
        Response::Collection(mut collection) => {
            let items = collection.collect_all().await?;
            if json {
                print_json(&items)
            } else {
                println!("{}", resource_table(&items));
                println!("\n{} items", items.len());
                Ok(())
            }
        }
    }
}

fn ensure_ok(response: &Response) -> springserve::Result<()> {
    if response.ok() {
        return Ok(());
    }
    Err(SpringServeError::ApiError {
        message: response.raw().to_string(),
        status_code: None,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> springserve::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
