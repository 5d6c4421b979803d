pub mod agents;
pub mod args;
pub mod decisions;
pub mod meeting;
pub mod requests;

pub use agents::handle_agents_command;
pub use args::{Cli, CliCommand};
pub use decisions::handle_decisions_command;
pub use meeting::{
    handle_idea_review_command, handle_meeting_command, handle_meetings_command,
    handle_retro_command, handle_standup_command, handle_strategy_command,
};
pub use requests::handle_requests_command;
