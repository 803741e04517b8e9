use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use tornado::client::{
    AudioBitrate, AudioCodec, Format, JobListFilter, JobOptions, JobStatus, MaxResolution,
    QualityPreset, StorageProvider, VideoCodec,
};
use tornado::config::HumanDuration;
use tornado::webhook::EventKind;

#[derive(Parser, Debug)]
#[command(name = "tornado")]
#[command(about = "Tornado API client and webhook receiver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and track download jobs
    #[command(subcommand)]
    Job(JobCommand),
    /// Inspect batches created by bulk requests
    #[command(subcommand)]
    Batch(BatchCommand),
    /// Fetch metadata for a URL without downloading it
    Metadata { url: String },
    /// Configure where finished files are uploaded
    #[command(subcommand)]
    Storage(StorageCommand),
    /// Account usage and dashboard data
    #[command(subcommand)]
    Account(AccountCommand),
    /// Run operations from a JSON file, one item at a time
    Run(RunArgs),
    /// Receive Tornado webhooks and print matching events as JSON lines
    Server(ServerArgs),
    /// Inspect the resolved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Create a download job
    Create(CreateArgs),
    /// Get the current status of a job
    Status { job_id: String },
    /// Wait until a job completes or fails
    Wait {
        job_id: String,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// List jobs
    List(ListArgs),
    /// Cancel a job
    Cancel { job_id: String },
    /// Retry a failed job
    Retry { job_id: String },
    /// Delete the uploaded file of a job
    DeleteFile { job_id: String },
    /// Create one job per URL with shared options
    Bulk(BulkArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Video or show URL to download
    pub url: String,
    #[command(flatten)]
    pub options: JobOptionsArgs,
    /// Wait for the job to finish before returning
    #[arg(long)]
    pub wait: bool,
    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(clap::Args, Debug)]
pub struct BulkArgs {
    /// URLs to download
    pub urls: Vec<String>,
    /// JSON file with `[{"url": ..., "filename": ...}]` entries
    #[arg(long, conflicts_with = "urls")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub options: JobOptionsArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct JobOptionsArgs {
    /// Output container format
    #[arg(long, value_enum)]
    pub format: Option<Format>,
    #[arg(long, value_enum)]
    pub video_codec: Option<VideoCodec>,
    #[arg(long, value_enum)]
    pub audio_codec: Option<AudioCodec>,
    #[arg(long, value_enum)]
    pub audio_bitrate: Option<AudioBitrate>,
    /// CRF 0-51, lower is better
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub video_quality: Option<u8>,
    #[arg(long, value_enum)]
    pub max_resolution: Option<MaxResolution>,
    /// Filename without extension
    #[arg(long)]
    pub filename: Option<String>,
    /// Storage folder prefix
    #[arg(long)]
    pub folder: Option<String>,
    /// URL notified when the job finishes
    #[arg(long)]
    pub webhook_url: Option<String>,
    #[arg(long)]
    pub audio_only: bool,
    #[arg(long)]
    pub download_subtitles: bool,
    #[arg(long)]
    pub download_thumbnail: bool,
    #[arg(long, value_enum)]
    pub quality_preset: Option<QualityPreset>,
    /// Clip start, e.g. 00:01:30
    #[arg(long)]
    pub clip_start: Option<String>,
    #[arg(long)]
    pub clip_end: Option<String>,
    #[arg(long)]
    pub live_recording: bool,
    #[arg(long)]
    pub live_from_start: bool,
    /// Maximum duration in seconds (0 = unlimited)
    #[arg(long)]
    pub max_duration: Option<u32>,
    #[arg(long)]
    pub wait_for_video: bool,
    /// Also send progress webhooks
    #[arg(long)]
    pub enable_progress_webhook: bool,
}

impl From<JobOptionsArgs> for JobOptions {
    fn from(args: JobOptionsArgs) -> Self {
        JobOptions {
            format: args.format,
            video_codec: args.video_codec,
            audio_codec: args.audio_codec,
            audio_bitrate: args.audio_bitrate,
            video_quality: args.video_quality,
            max_resolution: args.max_resolution,
            filename: args.filename,
            folder: args.folder,
            webhook_url: args.webhook_url,
            audio_only: args.audio_only,
            download_subtitles: args.download_subtitles,
            download_thumbnail: args.download_thumbnail,
            quality_preset: args.quality_preset,
            clip_start: args.clip_start,
            clip_end: args.clip_end,
            live_recording: args.live_recording,
            live_from_start: args.live_from_start,
            max_duration: args.max_duration,
            wait_for_video: args.wait_for_video,
            enable_progress_webhook: args.enable_progress_webhook,
        }
    }
}

#[derive(clap::Args, Debug, Default)]
pub struct PollArgs {
    /// Maximum time to wait, e.g. 600, 10m (default from config)
    #[arg(long)]
    pub timeout: Option<HumanDuration>,
    /// Time between status checks, e.g. 5s (default from config)
    #[arg(long)]
    pub interval: Option<HumanDuration>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
    /// Only jobs with this status (Pending, Processing, Completed, Failed)
    #[arg(long)]
    pub status: Option<JobStatus>,
}

impl From<ListArgs> for JobListFilter {
    fn from(args: ListArgs) -> Self {
        JobListFilter {
            limit: args.limit,
            offset: args.offset,
            status: args.status,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    /// Get the status of a batch and its jobs
    Status { batch_id: String },
}

#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    /// Upload finished files to your own S3-compatible bucket
    Configure(BucketArgs),
    /// Go back to the default Tornado storage
    Reset,
}

#[derive(clap::Args, Debug)]
pub struct BucketArgs {
    #[arg(long, value_enum, default_value = "aws")]
    pub provider: StorageProvider,
    /// e.g. https://s3.us-east-1.amazonaws.com
    #[arg(long)]
    pub endpoint: String,
    #[arg(long)]
    pub bucket: String,
    /// Use "auto" for Cloudflare R2
    #[arg(long, default_value = "us-east-1")]
    pub region: String,
    #[arg(long)]
    pub access_key: String,
    #[arg(long)]
    pub secret_key: String,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Usage statistics for the current billing period
    Usage,
    /// Dashboard data, e.g. `stats`
    Dashboard { section: String },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// JSON file holding an array of operations
    pub file: PathBuf,
    /// Record failing items as {"error": ...} and keep going
    #[arg(long)]
    pub continue_on_fail: bool,
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the webhook receiver to (default from config)
    #[arg(long)]
    pub address: Option<SocketAddr>,
    /// Path Tornado posts to (default from config)
    #[arg(long)]
    pub path: Option<String>,
    /// Event to forward (default from config)
    #[arg(long, value_enum)]
    pub event: Option<EventKind>,
    /// Only forward events for this job
    #[arg(long)]
    pub job_id: Option<String>,
    /// Only forward events for this batch
    #[arg(long)]
    pub batch_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved configuration as TOML (secrets omitted)
    Show,
}
