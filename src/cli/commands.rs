//! Subcommand handlers: interactive studio, one-shot generation, server
//! queries and config actions.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::Duration;

use super::args::ConfigAction;
use super::prompt::{PromptCommand, PromptInput, HELP};
use crate::backend::{ClientError, VideoClient};
use crate::config::{default_path as get_config_path, Settings, DEFAULT_CONFIG_TOML};
use crate::studio::{
    draw, progress_bar, write_result, DownloadHelper, NotificationKind, Orchestrator,
    SubmitOutcome, UiState,
};

/// How often the terminal front end redraws.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

fn build_client(settings: &Settings) -> Result<VideoClient, String> {
    VideoClient::with_timeout(settings.base_url.clone(), settings.request_timeout)
        .map_err(|e| format!("Failed to create client: {}", e))
}

fn build_studio(settings: &Settings, client: VideoClient) -> Orchestrator {
    Orchestrator::with_settings(client, settings.timing, settings.notification_queue())
}

fn print_progress(percent: f64) {
    print!("\r{}", progress_bar(percent));
    let _ = io::stdout().flush();
}

/// Print notifications that became visible since the last call.
fn flush_notifications(studio: &mut Orchestrator, last_printed: &mut Option<u64>) {
    studio.view();
    let fresh: Vec<(u64, NotificationKind, String)> = studio
        .state()
        .notifications
        .visible()
        .filter(|n| last_printed.map_or(true, |last| n.id > last))
        .map(|n| (n.id, n.kind, n.message.clone()))
        .collect();

    for (id, kind, message) in fresh {
        match kind {
            NotificationKind::Error | NotificationKind::Warning => {
                eprintln!("[{}] {}", kind.label(), message)
            }
            _ => println!("[{}] {}", kind.label(), message),
        }
        *last_printed = Some(id);
    }
}

/// Draw the panels of the current frame, without notifications.
fn print_panels(studio: &mut Orchestrator) {
    let mut view = studio.view();
    view.notifications.clear();
    let mut stdout = io::stdout();
    let _ = draw(&view, &mut stdout);
    let _ = stdout.flush();
}

/// Wait for the in-flight request while redrawing the progress bar.
async fn wait_with_progress(studio: &mut Orchestrator) {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    while !studio.request_finished() {
        frames.tick().await;
        print_progress(studio.state().progress);
    }
    studio.resolve().await;
    if matches!(studio.ui(), UiState::Success(_)) {
        print_progress(studio.state().progress);
    }
    println!();
}

async fn save_current(studio: &mut Orchestrator, downloader: &DownloadHelper) {
    let Some(result) = studio.ui().result().cloned() else {
        studio.notify(NotificationKind::Info, "Nothing to download yet");
        return;
    };
    match downloader.save(&result).await {
        Ok(path) => {
            studio.notify(NotificationKind::Success, "Download started!");
            println!("Saved to {}", path.display());
        }
        Err(e) => {
            log::error!("Download failed: {}", e);
            studio.notify(NotificationKind::Error, format!("Download failed: {}", e));
        }
    }
}

/// Run the interactive studio until `/quit`, EOF or Ctrl-C while idle.
pub async fn run_interactive(settings: &Settings) -> Result<(), String> {
    let client = build_client(settings)?;
    let downloader = DownloadHelper::new(settings.download_dir.clone(), client.http_client().clone());
    let mut studio = build_studio(settings, client);

    // Ctrl-C aborts the request in flight, or exits when idle.
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .map_err(|e| format!("Failed to install Ctrl-C handler: {}", e))?;

    println!("reelprompt studio - server: {}", studio.client().base_url());
    println!("{}", HELP);
    println!();

    let (_input, commands) = PromptInput::spawn_listener();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut last_printed = None;

    'studio: loop {
        frames.tick().await;

        if interrupted.swap(false, Ordering::SeqCst) {
            if studio.abort() {
                println!();
            } else {
                break;
            }
        }

        loop {
            let command = match commands.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'studio,
            };

            match command {
                PromptCommand::Generate(prompt) => match studio.submit(&prompt) {
                    SubmitOutcome::Started => println!("Generating video..."),
                    SubmitOutcome::Rejected(_) | SubmitOutcome::Busy => {}
                },
                PromptCommand::Another => {
                    if studio.generate_another() {
                        println!("Ready for a new prompt.");
                    }
                }
                PromptCommand::Download => {
                    save_current(&mut studio, &downloader).await;
                }
                PromptCommand::Abort => {
                    if !studio.abort() {
                        studio.notify(NotificationKind::Info, "No request in flight");
                    }
                }
                PromptCommand::Health => {
                    if let Err(e) = print_health(studio.client()).await {
                        studio.notify(NotificationKind::Error, e);
                    }
                }
                PromptCommand::Help => println!("{}", HELP),
                PromptCommand::Quit => break 'studio,
            }
        }

        if studio.is_busy() {
            if studio.request_finished() {
                studio.resolve().await;
                print_progress(studio.state().progress);
                println!();
                print_panels(&mut studio);
                PromptInput::print_prompt();
            } else {
                print_progress(studio.state().progress);
            }
        }

        flush_notifications(&mut studio, &mut last_printed);
    }

    if studio.abort() {
        studio.resolve().await;
    }
    println!("Bye.");
    Ok(())
}

/// Generate one video, print the result and optionally save it.
pub async fn run_generate(settings: &Settings, prompt: &str, download: bool) -> Result<(), String> {
    let client = build_client(settings)?;
    let downloader = DownloadHelper::new(settings.download_dir.clone(), client.http_client().clone());
    let mut studio = build_studio(settings, client);

    match studio.submit(prompt) {
        SubmitOutcome::Started => {}
        SubmitOutcome::Rejected(reason) => return Err(reason),
        SubmitOutcome::Busy => return Err("A request is already in flight".to_string()),
    }

    if let Some(token) = studio.cancel_token() {
        ctrlc::set_handler(move || token.cancel())
            .map_err(|e| format!("Failed to install Ctrl-C handler: {}", e))?;
    }

    println!("Generating video for: \"{}\"", prompt.trim());
    wait_with_progress(&mut studio).await;

    match studio.ui().clone() {
        UiState::Success(result) => {
            let view = crate::studio::ResultView::from_result(&result);
            write_result(&view, &mut io::stdout()).map_err(|e| e.to_string())?;

            if download {
                let path = downloader
                    .save(&result)
                    .await
                    .map_err(|e| format!("Failed to save video: {}", e))?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
        UiState::Error(message) => Err(message),
        other => Err(format!("Unexpected state after generation: {}", other.name())),
    }
}

async fn print_health(client: &VideoClient) -> Result<(), String> {
    let health = client.health().await.map_err(describe_query_error)?;

    println!(
        "Server: {} ({})",
        health.service.as_deref().unwrap_or("unknown service"),
        client.base_url()
    );
    println!("  Status:         {}", health.status);
    if let Some(ref version) = health.version {
        println!("  Version:        {}", version);
    }
    if let Some(configured) = health.api_configured {
        println!("  API configured: {}", if configured { "yes" } else { "no" });
    }
    if !health.features.is_empty() {
        println!("  Features:       {}", health.features.join(", "));
    }
    if let Some(ref ts) = health.timestamp {
        println!("  Checked at:     {}", ts);
    }

    if health.is_healthy() {
        Ok(())
    } else {
        Err(format!("Server reports status '{}'", health.status))
    }
}

fn describe_query_error(e: ClientError) -> String {
    match e {
        ClientError::Http(ref inner) if inner.is_connect() => {
            format!("Could not reach the video server: {}", inner)
        }
        other => other.to_string(),
    }
}

/// `health` subcommand.
pub async fn run_health(settings: &Settings) -> Result<(), String> {
    let client = build_client(settings)?;
    print_health(&client).await
}

/// `info` subcommand.
pub async fn run_info(settings: &Settings) -> Result<(), String> {
    let client = build_client(settings)?;
    let info = client.api_info().await.map_err(describe_query_error)?;

    println!(
        "{} {}",
        info.api_name.as_deref().unwrap_or("Video API"),
        info.version.as_deref().unwrap_or("")
    );
    if let Some(ref model) = info.model_details {
        println!("Model:");
        if let Some(ref name) = model.primary_model {
            println!("  Name:         {}", name);
        }
        if let Some(ref provider) = model.provider {
            println!("  Provider:     {}", provider);
        }
        if let Some(ref caps) = model.capabilities {
            println!("  Capabilities: {}", caps);
        }
    }
    if !info.features.is_empty() {
        println!("Features:");
        for (name, description) in &info.features {
            println!("  {:<22} {}", name, description);
        }
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, settings: &Settings) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Server:               {}", settings.base_url);
            println!("  Request timeout:      {}s", settings.request_timeout.as_secs());
            println!("  Success delay:        {}ms", settings.timing.success_delay.as_millis());
            println!("  Progress tick:        {}ms", settings.timing.progress_tick.as_millis());
            println!(
                "  Progress reset:       {}ms",
                settings.timing.progress_reset_delay.as_millis()
            );
            println!("  Notifications:        {}", settings.notification_capacity);
            println!(
                "  Notification time:    {}ms",
                settings.notification_timing.duration.as_millis()
            );
            println!("  Download directory:   {}", settings.download_dir.display());
            println!();

            let config_path = get_config_path();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            let config_path = get_config_path();

            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'reelprompt config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
