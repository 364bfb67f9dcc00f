use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Show one plugin's settings, schema, and version.
    Get(GetArgs),
    /// Show settings for every registered plugin.
    List,
    /// Validate and store a plugin's settings.
    Put(PutArgs),
    /// Print the JSON Schema of a response type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GetArgs {
    /// Plugin id, `<package>:<plugin>`.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["raw", "file"])))]
pub struct PutArgs {
    /// Plugin id, `<package>:<plugin>`.
    pub id: String,

    /// Settings as JSON5 text.
    #[arg(long)]
    pub raw: Option<String>,

    /// Read settings JSON5 text from a file (`-` for stdin).
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaKind {
    /// A single settings record.
    Record,
    /// The listing of every plugin.
    Listing,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Which response to describe.
    #[arg(default_value = "record")]
    pub kind: SchemaKind,
}
