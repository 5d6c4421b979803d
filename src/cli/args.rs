use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Run virtual meetings between configured roles", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Start the HTTP server
    Serve(ServeCliArgs),
    /// Run a daily standup
    Standup(StandupCliArgs),
    /// Run a strategy session on a topic
    Strategy(DiscussionCliArgs),
    /// Review an idea or proposal file
    IdeaReview(IdeaReviewCliArgs),
    /// Run a project retrospective
    Retro(RetroCliArgs),
    /// Run a meeting on any topic
    Meeting(MeetingCliArgs),
    /// View past meeting transcripts
    Meetings(MeetingsCliArgs),
    /// View and manage the decision log
    Decisions(DecisionsCliArgs),
    /// List available participants
    Agents,
    /// Track feature requests
    Requests(RequestsCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ServeCliArgs {
    /// Host to bind to (default from config)
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on (default from config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct StandupCliArgs {
    /// Comma-separated participant ids (default: the meeting type's lineup)
    #[arg(short, long)]
    pub agents: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct DiscussionCliArgs {
    /// Topic for the discussion
    #[arg(short, long)]
    pub topic: String,
    /// Comma-separated participant ids
    #[arg(short, long)]
    pub agents: Option<String>,
    /// Facilitator participant id
    #[arg(short, long)]
    pub facilitator: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct IdeaReviewCliArgs {
    /// Path to the idea file to review
    #[arg(short, long)]
    pub idea: PathBuf,
    /// Comma-separated participant ids
    #[arg(short, long)]
    pub agents: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct RetroCliArgs {
    /// Name of the project to review
    #[arg(short, long)]
    pub project: String,
    /// Comma-separated participant ids
    #[arg(short, long)]
    pub agents: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct MeetingCliArgs {
    /// Topic for the meeting
    #[arg(short, long)]
    pub topic: String,
    /// Meeting type to use as the template
    #[arg(short = 'm', long = "type", default_value = "custom")]
    pub meeting_type: String,
    /// Comma-separated participant ids
    #[arg(short, long)]
    pub agents: Option<String>,
    /// Facilitator participant id
    #[arg(short, long)]
    pub facilitator: Option<String>,
    /// Skip the closing synthesis
    #[arg(long)]
    pub no_synthesis: bool,
    /// File with extra material to add to the context
    #[arg(long)]
    pub extra: Option<PathBuf>,
    /// Replace the default turn prompt
    #[arg(long)]
    pub prompt: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct MeetingsCliArgs {
    #[command(subcommand)]
    pub command: MeetingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeetingsCommand {
    /// List recent transcripts
    List {
        /// Number of recent meetings to show
        #[arg(short = 'n', long, default_value = "10")]
        last: usize,
        /// Only show this meeting type
        #[arg(long = "type")]
        meeting_type: Option<String>,
    },
    /// Print one transcript as markdown
    Show {
        /// Meeting id
        id: String,
    },
}

#[derive(ClapArgs, Debug)]
pub struct DecisionsCliArgs {
    #[command(subcommand)]
    pub command: DecisionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DecisionsCommand {
    /// List decisions, newest first
    List {
        /// Number of recent decisions to show
        #[arg(short = 'n', long, default_value = "10")]
        last: usize,
        /// Filter by topic (substring match)
        #[arg(short, long)]
        topic: Option<String>,
        /// Filter by status (pending, in_progress, completed)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by owner (substring match)
        #[arg(short, long)]
        owner: Option<String>,
    },
    /// Record a decision
    Add {
        #[arg(short, long)]
        topic: String,
        /// The decision itself
        #[arg(short, long)]
        decision: String,
        #[arg(short, long, default_value = "")]
        rationale: String,
        #[arg(short, long, default_value = "")]
        owner: String,
        /// Meeting the decision came from
        #[arg(short, long)]
        meeting: Option<String>,
    },
    /// Advance a decision's status
    Status {
        id: i64,
        /// in_progress or completed
        status: String,
    },
}

#[derive(ClapArgs, Debug)]
pub struct RequestsCliArgs {
    #[command(subcommand)]
    pub command: RequestsCommand,
}

#[derive(Subcommand, Debug)]
pub enum RequestsCommand {
    /// List feature requests
    List {
        #[arg(short, long)]
        status: Option<String>,
        /// Only requests submitted by this participant
        #[arg(long)]
        submitter: Option<String>,
        #[arg(short = 'n', long)]
        last: Option<usize>,
    },
    /// Submit a feature request on behalf of a participant
    Submit {
        /// Submitting participant id
        #[arg(short = 'b', long = "by")]
        submitter: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// low, medium, high or critical
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },
    /// Change a request's status
    Status { id: i64, status: String },
    /// Vote for or against a request
    Vote {
        id: i64,
        /// Voting participant id
        participant: String,
        /// support or oppose
        stance: String,
    },
}
