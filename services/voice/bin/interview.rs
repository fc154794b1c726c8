//! Console Interview Runner
//!
//! Runs one founder interview end to end in the terminal:
//! 1. Loads configuration from the environment and command line.
//! 2. Registers a session for the room.
//! 3. Spawns the voice agent over a console speech pipeline.
//! 4. Runs the scripted interviewer against the same session.
//! 5. Removes the session and prints the transcript as JSON.

use anyhow::Context;
use clap::Parser;
use interview_core::SessionRegistry;
use interview_voice::{
    agent::{AgentSettings, VoiceAgent, join_agent},
    config::Config,
    interviewer::{ScriptedInterviewer, default_questions, load_questions},
    room::new_room_name,
    speech::ConsolePipeline,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Run a founder interview in the terminal")]
struct Cli {
    /// Room name to register the session under. Generated if omitted.
    #[arg(long)]
    room: Option<String>,

    /// File with one question per line. Overrides QUESTIONS_PATH.
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Seconds to wait for each answer. Overrides ANSWER_TIMEOUT_SECS.
    #[arg(long, value_name = "SECS")]
    answer_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(secs) = cli.answer_timeout {
        config.answer_timeout = Duration::from_secs(secs);
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let questions = match cli.questions.or(config.questions_path.clone()) {
        Some(path) => load_questions(&path)?,
        None => default_questions(),
    };

    // --- 3. Register the Session ---
    let registry = SessionRegistry::new();
    let room = cli.room.unwrap_or_else(new_room_name);
    let session = registry.get_or_create(&room);
    info!(
        %room,
        questions = questions.len(),
        answer_timeout = ?config.answer_timeout,
        "Starting interview"
    );

    // --- 4. Start the Voice Agent ---
    let agent = VoiceAgent::new(
        Arc::new(ConsolePipeline::spawn()),
        session.responder(config.question_timeout),
        AgentSettings {
            speech_timeout: config.speech_timeout,
        },
    );
    let agent_task = tokio::spawn(async move { agent.run().await });

    // --- 5. Run the Interviewer ---
    let controller = session.controller(config.answer_timeout);
    let interviewer = ScriptedInterviewer::new(questions).with_pause(config.question_pause);
    let transcript = tokio::select! {
        result = interviewer.run(&controller) => result.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, ending the interview early");
            controller.finish();
            Err(anyhow::anyhow!("interview interrupted"))
        }
    };

    // --- 6. Wind Down ---
    // The agent may still be listening; a second Ctrl-C stops waiting for it.
    let agent_result = join_agent(agent_task, async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        warn!("Interrupted while waiting for the voice agent, abandoning it");
    })
    .await;
    registry.remove(&room);

    if let Ok(transcript) = &transcript {
        println!("{}", serde_json::to_string_pretty(transcript)?);
    }
    let outcome = agent_result?;
    info!(?outcome, "Voice agent finished");
    transcript.map(|_| ())
}
