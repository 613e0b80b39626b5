use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tolk_client::rtc::{RtcAudioSource, RtcSessionFactory};
use tolk_client::{
    ClientConfig, ListenerPolicy, LocalMedia, Orchestrator, OrchestratorEvent, RelayPolicy,
    RolePolicy, SIGNALING_URL_ENV, SignalingChannel, SpeakerPolicy, TURN_PASSWORD_ENV,
    TURN_URL_ENV, TURN_USER_ENV,
};
use tolk_core::topology::{
    choose_auto_source_language, choose_auto_target_language, default_listener_language,
    language_options, relay_rooms, sub_room_name,
};
use tolk_core::{RoomDetails, RoomName};
use tolk_server::{ServerConfig, init_tracing, serve};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tolk", version, about = "Signaling for live interpreted audio rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve {
        #[arg(long, env = "HOST")]
        host: Option<String>,

        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Print the languages and rooms each role would pick for a room.
    Plan {
        /// Room details JSON document.
        details: PathBuf,

        /// Language a listener asks for.
        #[arg(long)]
        language: Option<String>,
    },
    /// Join a room as one participant.
    Join {
        #[arg(long, value_enum)]
        role: CliRole,

        /// Room details JSON; languages not given explicitly are chosen from it.
        #[arg(long)]
        details: Option<PathBuf>,

        /// Room code, required without `--details`.
        #[arg(long)]
        room: Option<String>,

        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        src: Option<String>,

        #[arg(long)]
        tgt: Option<String>,

        /// Pick the listening language interactively.
        #[arg(long)]
        pick: bool,

        /// Signaling endpoint, e.g. `ws://127.0.0.1:5002/signal`.
        #[arg(long, env = "TOLK_SIGNALING_URL")]
        url: Option<String>,

        #[arg(long, env = "TOLK_TURN_URL")]
        turn: Option<String>,

        #[arg(long, env = "TOLK_TURN_USER")]
        turn_user: Option<String>,

        #[arg(long, env = "TOLK_TURN_PASSWORD", hide_env_values = true)]
        turn_password: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliRole {
    Speaker,
    Relay,
    Listener,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            println!(
                "{} {}",
                "Signaling server on".green().bold(),
                config.bind_addr()?.to_string().cyan()
            );
            serve(config).await?;
        }
        Commands::Plan { details, language } => {
            let details = read_details(&details)?;
            print_plan(&details, language.as_deref());
        }
        Commands::Join {
            role,
            details,
            room,
            id,
            src,
            tgt,
            pick,
            url,
            turn,
            turn_user,
            turn_password,
        } => {
            let details = details.as_deref().map(read_details).transpose()?;
            let tgt = match (&details, pick) {
                (Some(details), true) if matches!(role, CliRole::Listener) => Some(pick_language(details)?),
                _ => tgt,
            };
            let policy = build_policy(role, details.as_ref(), room, id.as_deref(), src.as_deref(), tgt.as_deref())?;

            // Flags win over the environment; clap already folds the variables in.
            let config = ClientConfig::from_lookup(|key| match key {
                SIGNALING_URL_ENV => url.clone(),
                TURN_URL_ENV => turn.clone(),
                TURN_USER_ENV => turn_user.clone(),
                TURN_PASSWORD_ENV => turn_password.clone(),
                _ => None,
            })?;
            join(policy, role, &config).await?;
        }
    }

    Ok(())
}

fn read_details(path: &Path) -> Result<RoomDetails> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a room details document", path.display()))
}

fn build_policy(
    role: CliRole,
    details: Option<&RoomDetails>,
    room: Option<String>,
    id: Option<&str>,
    src: Option<&str>,
    tgt: Option<&str>,
) -> Result<Box<dyn RolePolicy>> {
    let policy: Box<dyn RolePolicy> = match (role, details) {
        (CliRole::Speaker, Some(d)) => Box::new(SpeakerPolicy::from_details(d, id, src)),
        (CliRole::Relay, Some(d)) => Box::new(RelayPolicy::from_details(d, id, src, tgt)),
        (CliRole::Listener, Some(d)) => Box::new(ListenerPolicy::from_details(d, id, tgt)),
        (role, None) => {
            let Some(room) = room.filter(|r| !r.trim().is_empty()) else {
                bail!("either --details or --room is required");
            };
            match role {
                CliRole::Speaker => Box::new(SpeakerPolicy::new(&room, id, src)),
                CliRole::Relay => Box::new(RelayPolicy::new(&room, id, src, tgt)),
                CliRole::Listener => Box::new(ListenerPolicy::new(&room, id, tgt)),
            }
        }
    };
    Ok(policy)
}

fn pick_language(details: &RoomDetails) -> Result<String> {
    let options = language_options(details);
    if options.is_empty() {
        bail!("room {} offers no languages", details.code);
    }
    let labels: Vec<String> = options.iter().map(|o| o.label()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Listen in")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(options[selection].language.code.clone())
}

fn print_plan(details: &RoomDetails, language: Option<&str>) {
    let code = details.code.as_str();
    println!("{} {}", "Room".green().bold(), code.bold());

    let src = choose_auto_source_language(details);
    let tgt = src
        .as_deref()
        .and_then(|src| choose_auto_target_language(details, src));
    println!(
        "  {} {}",
        "speaker  ->".cyan(),
        src.as_deref()
            .map(|src| sub_room_name(code, src).to_string())
            .unwrap_or_else(|| format!("{} (no source language)", code))
    );

    let (upstream, downstream) = relay_rooms(code, src.as_deref(), tgt.as_deref());
    println!(
        "  {} {} {} {}",
        "relay    ->".cyan(),
        upstream,
        "=>".dimmed(),
        downstream
    );

    let listen = default_listener_language(details, language);
    let listener_room = listen
        .as_deref()
        .map(|lang| sub_room_name(code, lang))
        .unwrap_or_else(|| RoomName::from(code));
    println!("  {} {}", "listener ->".cyan(), listener_room);

    println!("{}", "Languages".green().bold());
    for option in language_options(details) {
        let marker = if Some(option.language.code.as_str()) == listen.as_deref() {
            "*".yellow().bold()
        } else {
            " ".normal()
        };
        println!("  {} {:<8} {}", marker, option.language.code, option.label());
    }
}

async fn join(policy: Box<dyn RolePolicy>, role: CliRole, config: &ClientConfig) -> Result<()> {
    let (channel, channel_rx) = SignalingChannel::connect(config);
    let factory = Arc::new(RtcSessionFactory::new(config.ice_servers.clone()));

    let media: Option<Arc<dyn LocalMedia>> = match role {
        CliRole::Listener => None,
        CliRole::Speaker | CliRole::Relay => {
            let source = Arc::new(RtcAudioSource::new("tolk"));
            source.spawn_silence();
            Some(source)
        }
    };

    let (orchestrator, mut handle) = Orchestrator::new(
        policy,
        config,
        Arc::new(channel),
        channel_rx,
        factory,
        media,
    );
    let task = tokio::spawn(orchestrator.run());

    let interrupted = loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(OrchestratorEvent::LanguagesChosen { src, tgt }) => {
                    info!("Languages: src={:?} tgt={:?}", src, tgt);
                }
                Some(OrchestratorEvent::PeerConnected(peer)) => {
                    println!("{} {}", "connected".green(), peer);
                }
                Some(OrchestratorEvent::PeerClosed(peer)) => {
                    println!("{} {}", "closed".yellow(), peer);
                }
                Some(OrchestratorEvent::RemoteTrack { peer, track_id }) => {
                    info!("Receiving track {} from {}", track_id, peer);
                }
                Some(OrchestratorEvent::MediaUnavailable(e)) => {
                    warn!("Microphone unavailable: {}", e);
                }
                None => break false,
            },
            _ = tokio::signal::ctrl_c() => break true,
        }
    };

    if interrupted {
        println!("{}", "Leaving...".dimmed());
        if let Err(e) = handle.shutdown().await {
            warn!("Shutdown request not delivered: {}", e);
        }
    }

    task.await.context("orchestrator task panicked")?;
    Ok(())
}
