use clap::{Args as ClapArgs, Parser};

/// A tool for managing Obsidian notes with Ollama.
/// It can create semantic links and rate note quality.
///
/// Reads VAULT_DIRECTORY and OLLAMA_BASE_URL from the environment
/// (or a .env file in the working directory).
#[derive(Parser, Debug)]
#[command(version, about, long_about, arg_required_else_help = true)]
pub struct Args {
    #[clap(flatten)]
    pub mode: Mode,
}

/// Exactly one mode must be selected.
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct Mode {
    /// Finds and links semantically similar notes.
    #[clap(long)]
    pub note_linker: bool,

    /// Analyzes each note and adds a quality rating and feedback.
    #[clap(long)]
    pub note_quality: bool,
}
