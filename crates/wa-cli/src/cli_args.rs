use clap::{Args, Parser, Subcommand};
use wa_driver::DEFAULT_DRIVER_URL;
use wa_runtime::DEFAULT_SESSION_ID;

#[derive(Debug, Parser)]
#[command(name = "wa-cli")]
#[command(about = "Web automation script interpreter")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) driver: DriverArgs,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct DriverArgs {
    /// Base URL of the browser driver service.
    #[arg(
        long = "driver-url",
        env = "WA_DRIVER_URL",
        default_value = DEFAULT_DRIVER_URL,
        global = true
    )]
    pub(crate) driver_url: String,
    /// Browser session uid opened by the first NAVIGATE.
    #[arg(
        long = "session",
        env = "WA_SESSION",
        default_value = DEFAULT_SESSION_ID,
        global = true
    )]
    pub(crate) session: String,
    #[arg(
        long = "timeout-secs",
        env = "WA_DRIVER_TIMEOUT",
        default_value_t = 30,
        global = true
    )]
    pub(crate) timeout_secs: u64,
    /// Use an in-memory browser loaded from this JSON fixture.
    #[arg(long = "fixture", global = true)]
    pub(crate) fixture: Option<String>,
    #[arg(long = "verbose", short = 'v', global = true)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Repl(ReplArgs),
    /// Print every command with its parameter names as JSON.
    Commands,
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Run(RunArgs),
    Confirm(ConfirmArgs),
    Dispatch(DispatchArgs),
    Status(StatusArgs),
    Clear(ClearArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// Script file to run. Without it the script stored in --state-in runs.
    #[arg(long = "script")]
    pub(crate) script: Option<String>,
    #[arg(long = "state-in")]
    pub(crate) state_in: Option<String>,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ConfirmArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct DispatchArgs {
    /// One script line, e.g. `NAVIGATE "https://example.com"`.
    #[arg(long = "line")]
    pub(crate) line: String,
    #[arg(long = "state-in")]
    pub(crate) state_in: Option<String>,
    #[arg(long = "state-out")]
    pub(crate) state_out: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct StatusArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
}

#[derive(Debug, Args)]
pub(crate) struct ClearArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ReplArgs {
    /// Script file loaded before the first prompt.
    #[arg(long = "script")]
    pub(crate) script: Option<String>,
}
