use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::feature_requests::{
    FeatureRequest, FeatureRequestFilter, FeatureRequestStatus, FeatureRequests,
    NewFeatureRequest, Priority, VoteStance,
};
use crate::registry::Registry;

use super::args::{RequestsCliArgs, RequestsCommand};

pub fn handle_requests_command(args: RequestsCliArgs) -> Result<()> {
    let config = Config::load()?;
    let requests = FeatureRequests::new(
        Store::from_config(&config.storage)?,
        Arc::new(Registry::from_config(&config)?),
    );

    match args.command {
        RequestsCommand::List {
            status,
            submitter,
            last,
        } => {
            let filter = FeatureRequestFilter {
                status: status
                    .as_deref()
                    .map(FeatureRequestStatus::parse)
                    .transpose()?,
                submitter_id: submitter,
                limit: last,
            };
            let found = requests.list(&filter)?;
            if found.is_empty() {
                println!("No feature requests found.");
                return Ok(());
            }
            for request in &found {
                print_request(request);
            }
        }
        RequestsCommand::Submit {
            submitter,
            title,
            description,
            priority,
        } => {
            let created = requests.submit(NewFeatureRequest {
                submitter_id: submitter,
                title,
                description,
                priority: Priority::parse(&priority)?,
            })?;
            println!("Submitted feature request #{}", created.id);
        }
        RequestsCommand::Status { id, status } => {
            let updated = requests.update_status(id, FeatureRequestStatus::parse(&status)?)?;
            println!("Feature request #{} is now {}", updated.id, updated.status.as_str());
        }
        RequestsCommand::Vote {
            id,
            participant,
            stance,
        } => {
            let updated = requests.vote(id, &participant, VoteStance::parse(&stance)?)?;
            print_request(&updated);
        }
    }

    Ok(())
}

fn print_request(request: &FeatureRequest) {
    println!("#{} {} [{}]", request.id, request.title, request.status.as_str());
    println!(
        "   by {} | priority {} | +{} / -{}",
        request.submitter_id,
        request.priority.as_str(),
        request.supporters.len(),
        request.opposers.len()
    );
    if !request.description.is_empty() {
        println!("   {}", request.description);
    }
}
