use anyhow::Result;

use crate::config::Config;
use crate::db::Store;
use crate::decisions::{Decision, DecisionLog, DecisionQuery, DecisionStatus, NewDecision};

use super::args::{DecisionsCliArgs, DecisionsCommand};

pub fn handle_decisions_command(args: DecisionsCliArgs) -> Result<()> {
    let config = Config::load()?;
    let log = DecisionLog::new(Store::from_config(&config.storage)?);

    match args.command {
        DecisionsCommand::List {
            last,
            topic,
            status,
            owner,
        } => {
            let query = DecisionQuery {
                topic,
                status: status.as_deref().map(DecisionStatus::parse).transpose()?,
                owner,
                limit: Some(last),
            };
            let decisions = log.query(&query)?;

            if decisions.is_empty() {
                println!("No decisions found matching criteria.");
                return Ok(());
            }

            println!(
                "{:<5} {:<10} {:<30} {:<40} {:<15} {}",
                "ID", "Date", "Topic", "Decision", "Owner", "Status"
            );
            for decision in &decisions {
                print_row(decision);
            }
        }
        DecisionsCommand::Add {
            topic,
            decision,
            rationale,
            owner,
            meeting,
        } => {
            let record = log.append(NewDecision {
                topic,
                text: decision,
                rationale,
                owner,
                meeting_id: meeting,
            })?;
            println!("Recorded decision #{} ({})", record.id, record.status.as_str());
        }
        DecisionsCommand::Status { id, status } => {
            let status = DecisionStatus::parse(&status)?;
            let record = log.update_status(id, status)?;
            println!("Decision #{} is now {}", record.id, record.status.as_str());
        }
    }

    Ok(())
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn print_row(decision: &Decision) {
    println!(
        "{:<5} {:<10} {:<30} {:<40} {:<15} {}",
        decision.id,
        decision.date.format("%Y-%m-%d"),
        clip(&decision.topic, 30),
        clip(&decision.text, 40),
        clip(&decision.owner, 15),
        decision.status.as_str()
    );
}
