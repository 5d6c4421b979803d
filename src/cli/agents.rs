use anyhow::Result;

use crate::config::Config;
use crate::registry::{Registry, Team};

pub fn handle_agents_command() -> Result<()> {
    let config = Config::load()?;
    let registry = Registry::from_config(&config)?;

    for team in [Team::Executive, Team::Technical, Team::Operations] {
        let members: Vec<_> = registry.by_team(team).collect();
        if members.is_empty() {
            continue;
        }

        println!("{} team:", team.as_str());
        for participant in members {
            let reports_to = participant
                .reports_to
                .as_deref()
                .map(|boss| format!(" (reports to {})", boss))
                .unwrap_or_default();
            println!(
                "  {:<18} {:<16} {}{}",
                participant.id, participant.display_name, participant.title, reports_to
            );
        }
        println!();
    }

    println!("Meeting types:");
    for meeting_type in registry.meeting_types() {
        println!(
            "  {:<12} {:<20} {}",
            meeting_type.id,
            meeting_type.name,
            meeting_type.participants.join(", ")
        );
        if !meeting_type.context.is_empty() {
            let context: Vec<_> = meeting_type.context.iter().map(|kind| kind.title()).collect();
            println!("  {:<12} {:<20} context: {}", "", "", context.join(", "));
        }
    }

    Ok(())
}
