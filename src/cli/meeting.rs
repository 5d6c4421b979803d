//! CLI handlers for running meetings and reading transcripts.
//!
//! Meetings run in-process through the same orchestrator and database as
//! the HTTP server.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::app::Orchestrator;
use crate::config::Config;
use crate::db::Store;
use crate::error::MeetingError;
use crate::meeting::{
    prompts, render_markdown, Lineup, MeetingOutcome, MeetingPhase, MeetingRequest,
    TranscriptArchive, Transcript,
};

use super::args::{
    DiscussionCliArgs, IdeaReviewCliArgs, MeetingCliArgs, MeetingsCliArgs, MeetingsCommand,
    RetroCliArgs, StandupCliArgs,
};

pub async fn handle_standup_command(args: StandupCliArgs) -> Result<()> {
    let orchestrator = orchestrator()?;
    let request = MeetingRequest {
        lineup: lineup(&orchestrator, "standup", args.agents.as_deref(), None, None)?,
        topic: "Daily Standup".to_string(),
        prompt: None,
        extra_context: None,
    };
    run(&orchestrator, request).await
}

pub async fn handle_strategy_command(args: DiscussionCliArgs) -> Result<()> {
    let orchestrator = orchestrator()?;
    let request = MeetingRequest {
        lineup: lineup(
            &orchestrator,
            "strategy",
            args.agents.as_deref(),
            args.facilitator,
            None,
        )?,
        topic: args.topic,
        prompt: None,
        extra_context: None,
    };
    run(&orchestrator, request).await
}

pub async fn handle_idea_review_command(args: IdeaReviewCliArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.idea)
        .with_context(|| format!("Failed to read idea file {}", args.idea.display()))?;
    if content.trim().is_empty() {
        bail!("Idea file {} is empty", args.idea.display());
    }

    let topic = format!("Idea Review: {}", idea_title(&args.idea, &content));
    let orchestrator = orchestrator()?;
    let request = MeetingRequest {
        lineup: lineup(&orchestrator, "idea_review", args.agents.as_deref(), None, None)?,
        prompt: Some(prompts::idea_review(&topic, &content)),
        extra_context: Some(content),
        topic,
    };
    run(&orchestrator, request).await
}

pub async fn handle_retro_command(args: RetroCliArgs) -> Result<()> {
    let orchestrator = orchestrator()?;
    let request = MeetingRequest {
        lineup: lineup(&orchestrator, "retro", args.agents.as_deref(), None, None)?,
        prompt: Some(prompts::retrospective(&args.project)),
        topic: format!("Retrospective: {}", args.project),
        extra_context: None,
    };
    run(&orchestrator, request).await
}

pub async fn handle_meeting_command(args: MeetingCliArgs) -> Result<()> {
    let extra_context = args
        .extra
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;

    let orchestrator = orchestrator()?;
    let synthesis = args.no_synthesis.then_some(false);
    let request = MeetingRequest {
        lineup: lineup(
            &orchestrator,
            &args.meeting_type,
            args.agents.as_deref(),
            args.facilitator,
            synthesis,
        )?,
        topic: args.topic,
        prompt: args.prompt,
        extra_context,
    };
    run(&orchestrator, request).await
}

pub fn handle_meetings_command(args: MeetingsCliArgs) -> Result<()> {
    let config = Config::load()?;
    let archive = TranscriptArchive::new(Store::from_config(&config.storage)?);

    match args.command {
        MeetingsCommand::List { last, meeting_type } => {
            let meetings = archive.list(last, meeting_type.as_deref())?;
            if meetings.is_empty() {
                println!("No meetings found.");
                return Ok(());
            }

            println!(
                "Showing {} of {} meeting(s):\n",
                meetings.len(),
                archive.count()?
            );
            for m in meetings {
                println!("ID: {}", m.meeting_id);
                println!("Date: {}", m.created_at.format("%Y-%m-%d %H:%M"));
                println!("Type: {} ({})", m.meeting_name, m.meeting_type);
                println!("Topic: {}", truncate(&m.topic, 60));
                println!(
                    "Exchanges: {}{} | Status: {}",
                    m.exchange_count,
                    if m.has_synthesis { " + synthesis" } else { "" },
                    m.status.as_str()
                );
                println!("---");
            }
            println!("\nTo read a transcript, use: huddle meetings show <ID>");
            Ok(())
        }
        MeetingsCommand::Show { id } => match archive.get(&id)? {
            Some(transcript) => {
                println!("{}", render_markdown(&transcript));
                Ok(())
            }
            None => bail!("Meeting {} not found", id),
        },
    }
}

fn orchestrator() -> Result<Orchestrator> {
    let config = Config::load()?;
    Orchestrator::from_config(&config)
}

fn parse_agents(agents: Option<&str>) -> Option<Vec<String>> {
    let ids: Vec<String> = agents?
        .split(',')
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .collect();
    (!ids.is_empty()).then_some(ids)
}

/// A registered meeting type, or an ad hoc lineup built on it when the
/// participants, facilitator or synthesis flag are overridden.
fn lineup(
    orchestrator: &Orchestrator,
    meeting_type: &str,
    agents: Option<&str>,
    facilitator: Option<String>,
    synthesis: Option<bool>,
) -> Result<Lineup> {
    let participants = parse_agents(agents);
    if participants.is_none() && facilitator.is_none() && synthesis.is_none() {
        return Ok(Lineup::MeetingType(meeting_type.to_string()));
    }

    let participants = match participants {
        Some(participants) => participants,
        None => orchestrator
            .registry()
            .meeting_type(meeting_type)?
            .participants
            .clone(),
    };

    Ok(Lineup::AdHoc {
        template: meeting_type.to_string(),
        participants,
        facilitator: facilitator.map(|f| f.trim().to_lowercase()),
        synthesis,
    })
}

/// Title from the first `# ` heading, else from the file name.
fn idea_title(path: &Path, content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            title_case(&stem.replace(['-', '_'], " "))
        })
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run(orchestrator: &Orchestrator, request: MeetingRequest) -> Result<()> {
    let pb = create_spinner();
    pb.set_message(format!("Starting meeting: {}", request.topic));

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let progress = {
        let status = orchestrator.status().clone();
        let pb = pb.clone();
        tokio::spawn(async move {
            loop {
                let state = status.get().await;
                let message = match (state.phase, state.current_participant) {
                    (MeetingPhase::ComposingContext, _) => "Loading context...".to_string(),
                    (MeetingPhase::AwaitingResponse, Some(participant)) => format!(
                        "Waiting for {} (turn {})...",
                        participant,
                        state.turn_index.unwrap_or(0) + 1
                    ),
                    (MeetingPhase::Synthesizing, _) => "Synthesizing...".to_string(),
                    (MeetingPhase::Persisting, _) => "Saving transcript...".to_string(),
                    _ => String::new(),
                };
                if !message.is_empty() {
                    pb.set_message(message);
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        })
    };

    let result = orchestrator.run_meeting(request, &cancel).await;
    interrupt.abort();
    progress.abort();
    pb.finish_and_clear();

    match result {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.transcript() {
                print_exchanges(partial);
            }
            match &err {
                MeetingError::Generation {
                    participant,
                    turn_index,
                    source,
                    ..
                } => {
                    eprintln!(
                        "Meeting failed at '{}' (turn {}): {}",
                        participant, turn_index, source
                    );
                    if source.is_retryable() {
                        eprintln!("This failure is transient; running the meeting again may succeed.");
                    }
                }
                MeetingError::Cancelled { .. } => eprintln!("Meeting cancelled."),
                MeetingError::Persistence { .. } => {
                    eprintln!("The meeting completed but could not be saved. The transcript is shown above.")
                }
                MeetingError::Configuration(_) => {}
            }
            Err(err.into())
        }
    }
}

fn print_exchanges(transcript: &Transcript) {
    for exchange in &transcript.exchanges {
        println!("### {}\n{}\n", exchange.participant_name, exchange.text);
    }
}

fn print_outcome(outcome: &MeetingOutcome) {
    let transcript = &outcome.transcript;
    println!("{}", render_markdown(transcript));

    if !outcome.decisions.is_empty() {
        println!("Logged {} decision(s):", outcome.decisions.len());
        for decision in &outcome.decisions {
            println!("  #{} {} (owner: {})", decision.id, decision.text, decision.owner);
        }
    }
    println!("Meeting ID: {}", transcript.meeting_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agents() {
        assert_eq!(
            parse_agents(Some(" CEO, cfo,,cito ")),
            Some(vec!["ceo".to_string(), "cfo".to_string(), "cito".to_string()])
        );
        assert_eq!(parse_agents(Some(" , ")), None);
        assert_eq!(parse_agents(None), None);
    }

    #[test]
    fn test_idea_title_prefers_heading() {
        let path = Path::new("ideas/offline_mode.md");
        assert_eq!(idea_title(path, "intro\n# Offline Mode\nbody"), "Offline Mode");
        assert_eq!(idea_title(path, "no heading here"), "Offline Mode");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo world", 5), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }
}
