use anyhow::{Context, Result};
use apprtc_client::CallError;
use apprtc_client::config::{ClientConfig, DEFAULT_ROOM_SERVER};
use apprtc_client::session::{CallObserver, CallServices, CallSession, CallState};
use apprtc_client::transport::{MediaKind, RtcPeerFactory};
use async_trait::async_trait;
use clap::Parser;
use colored::*;
use dialoguer::Input;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apprtc-call")]
#[command(about = "Join an AppRTC room and hold one audio/video call")]
struct Cli {
    /// Room to join. Asked for interactively when omitted.
    room: Option<String>,

    #[arg(long, default_value = DEFAULT_ROOM_SERVER)]
    server: String,

    /// Seconds to wait for room, ICE and relay connections.
    #[arg(long, default_value_t = 5)]
    connect_timeout: u64,

    /// Seconds a room or ICE request may take, including the leave on hang-up.
    #[arg(long, default_value_t = 10)]
    request_timeout: u64,
}

struct ConsoleObserver {
    ended: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl CallObserver for ConsoleObserver {
    async fn on_state_change(&self, state: CallState) {
        let line = format!("Call {:?}", state);
        match state {
            CallState::Active => println!("{}", line.green().bold()),
            CallState::Terminated => {
                println!("{}", line.yellow().bold());
                let _ = self.ended.send(());
            }
            _ => println!("{}", line.cyan()),
        }
    }

    async fn on_error(&self, error: CallError) {
        eprintln!("{} {}", "error:".red().bold(), error);
    }

    async fn on_remote_track(&self, kind: MediaKind) {
        println!("{}", format!("Receiving remote {:?}", kind).green());
    }
}

fn prompt_room() -> Result<String> {
    let room: String = Input::new()
        .with_prompt("Room id")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("room id cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read room id")?;
    Ok(room.trim().to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let room = match cli.room {
        Some(room) => room,
        None => prompt_room()?,
    };

    let config = ClientConfig::new(&cli.server)
        .context("Invalid room server url")?
        .with_connect_timeout(Duration::from_secs(cli.connect_timeout))
        .with_request_timeout(Duration::from_secs(cli.request_timeout));
    let services = CallServices::new(&config, Arc::new(RtcPeerFactory::new()))
        .context("Failed to set up network clients")?;

    let (ended_tx, mut ended_rx) = mpsc::unbounded_channel();
    let (session, handle) = CallSession::new(services, Arc::new(ConsoleObserver { ended: ended_tx }));
    let task = tokio::spawn(session.run());

    println!(
        "{}",
        format!("Joining room '{}' on {}", room, config.room_server_url).bold()
    );
    handle.join(room).await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, hanging up");
            handle.hangup().await;
        }
        _ = ended_rx.recv() => {}
    }

    drop(handle);
    task.await.context("Call session panicked")?;
    Ok(())
}
