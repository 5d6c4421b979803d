use anyhow::Result;
use clap::Parser;
use huddle::{
    app,
    cli::{
        handle_agents_command, handle_decisions_command, handle_idea_review_command,
        handle_meeting_command, handle_meetings_command, handle_requests_command,
        handle_retro_command, handle_standup_command, handle_strategy_command, Cli, CliCommand,
    },
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CliCommand::Version => {
            println!("Huddle {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Serve(args) => {
            let mut config = Config::load()?;
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            app::run_server(config).await
        }
        CliCommand::Standup(args) => handle_standup_command(args).await,
        CliCommand::Strategy(args) => handle_strategy_command(args).await,
        CliCommand::IdeaReview(args) => handle_idea_review_command(args).await,
        CliCommand::Retro(args) => handle_retro_command(args).await,
        CliCommand::Meeting(args) => handle_meeting_command(args).await,
        CliCommand::Meetings(args) => handle_meetings_command(args),
        CliCommand::Decisions(args) => handle_decisions_command(args),
        CliCommand::Agents => handle_agents_command(),
        CliCommand::Requests(args) => handle_requests_command(args),
    }
}
