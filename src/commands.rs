use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{
    AccountCommand, BatchCommand, BulkArgs, Commands, ConfigCommand, JobCommand, PollArgs,
    ServerArgs, StorageCommand,
};
use tornado::client::{
    BucketConfig, BulkItem, HttpConfig, HttpTransport, JobOptions, PollRequest, TornadoClient,
};
use tornado::config::{Config, PollConfig};
use tornado::executor::{Executor, Operation};
use tornado::webhook::{self, StdoutSink};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(command: Commands, config: Config) -> Result<(), AnyError> {
    match command {
        Commands::Server(args) => serve(args, config).await,
        Commands::Config(ConfigCommand::Show) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        command => call_api(command, config).await,
    }
}

async fn call_api(command: Commands, config: Config) -> Result<(), AnyError> {
    let transport = HttpTransport::new(
        &config.api.base_url,
        config.api_key()?,
        HttpConfig::from(&config.api),
    )?;
    let client = TornadoClient::new(transport);

    match command {
        Commands::Job(job) => run_job(&client, job, &config.poll).await,
        Commands::Batch(BatchCommand::Status { batch_id }) => {
            print_json(&client.get_batch_status(&batch_id).await?)
        }
        Commands::Metadata { url } => print_json(&client.get_metadata(&url).await?),
        Commands::Storage(StorageCommand::Configure(args)) => {
            let bucket = BucketConfig {
                provider: args.provider,
                endpoint: args.endpoint,
                bucket: args.bucket,
                region: args.region,
                access_key: args.access_key,
                secret_key: args.secret_key,
            };
            print_json(&client.configure_bucket(&bucket).await?)
        }
        Commands::Storage(StorageCommand::Reset) => print_json(&client.reset_bucket().await?),
        Commands::Account(AccountCommand::Usage) => print_json(&client.get_usage().await?),
        Commands::Account(AccountCommand::Dashboard { section }) => {
            print_json(&client.get_dashboard(&section).await?)
        }
        Commands::Run(args) => {
            let raw = tokio::fs::read(&args.file).await?;
            let operations: Vec<Operation> = serde_json::from_slice(&raw)?;
            info!(items = operations.len(), file = %args.file.display(), "Running operations");

            let executor =
                Executor::new(client, config.poll.clone()).continue_on_fail(args.continue_on_fail);
            let results = executor.execute_items(operations, &cancel_on_ctrl_c()).await?;
            print_json(&results)
        }
        Commands::Server(_) | Commands::Config(_) => unreachable!("handled without an API client"),
    }
}

async fn run_job(
    client: &TornadoClient<HttpTransport>,
    command: JobCommand,
    defaults: &PollConfig,
) -> Result<(), AnyError> {
    match command {
        JobCommand::Create(args) => {
            let handle = client.create_job(&args.url, &args.options.into()).await?;
            if args.wait {
                let request = poll_request(handle.job_id().to_string(), &args.poll, defaults);
                let job = client
                    .wait_for_completion_with_cancel(request, &cancel_on_ctrl_c())
                    .await?;
                print_json(&job)
            } else {
                print_json(&handle)
            }
        }
        JobCommand::Status { job_id } => print_json(&client.get_job_status(&job_id).await?),
        JobCommand::Wait { job_id, poll } => {
            let request = poll_request(job_id, &poll, defaults);
            let job = client
                .wait_for_completion_with_cancel(request, &cancel_on_ctrl_c())
                .await?;
            print_json(&job)
        }
        JobCommand::List(args) => print_json(&client.list_jobs(&args.into()).await?),
        JobCommand::Cancel { job_id } => print_json(&client.cancel_job(&job_id).await?),
        JobCommand::Retry { job_id } => print_json(&client.retry_job(&job_id).await?),
        JobCommand::DeleteFile { job_id } => print_json(&client.delete_job_file(&job_id).await?),
        JobCommand::Bulk(args) => {
            let (items, options) = bulk_items(args).await?;
            print_json(&client.create_bulk_jobs(&items, &options).await?)
        }
    }
}

async fn bulk_items(args: BulkArgs) -> Result<(Vec<BulkItem>, JobOptions), AnyError> {
    let items = match &args.file {
        Some(path) => serde_json::from_slice(&tokio::fs::read(path).await?)?,
        None => args.urls.iter().map(BulkItem::new).collect(),
    };
    Ok((items, args.options.into()))
}

fn poll_request(job_id: String, args: &PollArgs, defaults: &PollConfig) -> PollRequest {
    PollRequest::new(
        job_id,
        args.timeout.unwrap_or(defaults.timeout).as_duration(),
        args.interval.unwrap_or(defaults.interval).as_duration(),
    )
}

async fn serve(args: ServerArgs, mut config: Config) -> Result<(), AnyError> {
    if let Some(address) = args.address {
        config.webhook.bind_addr = address;
    }
    if let Some(path) = args.path {
        if !path.starts_with('/') {
            return Err(format!("webhook path must start with '/': {}", path).into());
        }
        config.webhook.path = path;
    }
    if let Some(event) = args.event {
        config.webhook.event = event;
    }
    if args.job_id.is_some() {
        config.webhook.job_id = args.job_id;
    }
    if args.batch_id.is_some() {
        config.webhook.batch_id = args.batch_id;
    }

    webhook::run(&config.webhook, Arc::new(StdoutSink::new()), CancellationToken::new()).await
}

/// Ctrl+C interrupts the sleep between polls
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AnyError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
