use clap::ArgAction::Count;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as ClapShell;

#[derive(Debug, Clone, Parser)]
#[command(name = "compspec", author, version, about, long_about = None)]
/// Validate and query shell-completion specs.
pub struct CompspecParser {
    #[arg(short, long, action = Count, global = true)]
    /// Increase verbosity. (up to 3 times)
    pub verbose: u8,

    #[arg(short, long, global = true)]
    /// Omit any output except errors from compspec
    pub quiet: bool,

    #[arg(value_enum, short, long, global = true, default_value_t = LogFormat::Compact)]
    /// Sets the log format
    pub format: LogFormat,

    #[command(subcommand)]
    pub command: CompspecCommand,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CompspecCommand {
    /// Loads every configured definition and reports the ones that fail
    Check,
    /// Lists the registered commands and their versions
    List,
    Options(OptionsArgs),
    Subcommand(SubcommandArgs),
    Show(ShowArgs),
    Completions(CompletionsArgs),
}

#[derive(Debug, Args, Clone)]
/// Lists the options a command accepts at the position the tokens lead to
pub struct OptionsArgs {
    #[arg()]
    /// Command whose spec to query
    pub command: String,

    #[arg(last = true)]
    /// Tokens already typed after the command, given after `--`
    pub tokens: Vec<String>,

    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    /// Only list options with an alias starting with this
    pub prefix: String,

    #[arg(long)]
    /// Include hidden options
    pub hidden: bool,
}

#[derive(Debug, Args, Clone)]
/// Looks up a direct subcommand by its exact name
pub struct SubcommandArgs {
    #[arg()]
    /// Command whose spec to query
    pub command: String,

    #[arg()]
    /// Subcommand name
    pub token: String,
}

#[derive(Debug, Args, Clone)]
/// Prints a loaded spec
pub struct ShowArgs {
    #[arg()]
    /// Command whose spec to print
    pub command: String,

    #[arg(short = 'r', long)]
    /// Version to print instead of the one selected by default
    pub release: Option<String>,

    #[arg(value_enum, short, long, default_value_t = OutputFormat::Json)]
    /// Serialization of the printed spec
    pub output: OutputFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args, Clone)]
/// Generate a completion for the requested shell
pub struct CompletionsArgs {
    #[arg()]
    /// The shell to generate completions for
    pub shell: Shell,

    #[arg(short = 'F', long)]
    /// File to write to, if missing `stdout` is used
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    PowerShell,
    Zsh,
}

impl From<Shell> for ClapShell {
    fn from(val: Shell) -> Self {
        match val {
            Shell::Bash => ClapShell::Bash,
            Shell::Elvish => ClapShell::Elvish,
            Shell::Fish => ClapShell::Fish,
            Shell::PowerShell => ClapShell::PowerShell,
            Shell::Zsh => ClapShell::Zsh,
        }
    }
}
