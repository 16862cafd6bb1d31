mod cli;
mod config;
mod logging;
mod session;

use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chat_core::Filter;
use chat_engine::{
    list_channel_videos, parse_channel_id, write_export, EngineHandle, FetchSettings,
    ReqwestFetcher, VideoDescriptor,
};
use chat_logging::chat_info;
use chrono::Local;
use clap::Parser;

use cli::{Cli, CollectArgs, Command};
use config::ConfigFile;
use session::{export_path, select_videos, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());
    logging::initialize(cli.verbose, log_file.as_deref());
    let settings = config.apply(FetchSettings::default());

    match cli.command {
        Command::Videos { channel } => print_videos(settings, &channel),
        Command::Collect(args) => collect(settings, args),
    }
}

fn fetch_listing(settings: &FetchSettings, channel: &str) -> anyhow::Result<Vec<VideoDescriptor>> {
    let channel_id = parse_channel_id(channel)?;
    let fetcher = ReqwestFetcher::new(settings.clone())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let videos = runtime.block_on(list_channel_videos(&fetcher, &channel_id))?;
    Ok(videos)
}

fn print_videos(settings: FetchSettings, channel: &str) -> anyhow::Result<()> {
    let videos = fetch_listing(&settings, channel)?;
    let mut out = io::stdout().lock();
    for video in &videos {
        writeln!(
            out,
            "{:>10}  {}  {}",
            video.video_no,
            video.publish_day(),
            video.title
        )?;
    }
    Ok(())
}

fn collect(settings: FetchSettings, args: CollectArgs) -> anyhow::Result<()> {
    let filter = Filter::from_input(args.nickname.as_deref(), args.message.as_deref());
    let listing = match &args.channel {
        Some(channel) => fetch_listing(&settings, channel)?,
        None => Vec::new(),
    };
    let videos = select_videos(&listing, &args.videos, args.all);

    let engine = EngineHandle::new(settings)?;
    let interrupts = spawn_interrupt_listener()?;
    let mut session = Session::new(engine, io::stdout().lock());
    session.run(videos, filter, &interrupts)?;

    if let Some(output) = &args.output {
        let path = export_path(output, Local::now());
        let summary = write_export(&path, &session.export_blocks())
            .with_context(|| format!("failed to write export to {:?}", path))?;
        chat_info!(
            "saved {} chats from {} videos to {:?}",
            summary.record_count,
            summary.block_count,
            summary.path
        );
    }
    Ok(())
}

/// Forwards every Ctrl-C to the returned receiver instead of exiting, so the
/// batch can stop cooperatively.
fn spawn_interrupt_listener() -> anyhow::Result<mpsc::Receiver<()>> {
    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("interrupt-listener".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if tx.send(()).is_err() {
                        break;
                    }
                }
            });
        })?;
    Ok(rx)
}
