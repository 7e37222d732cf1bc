use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "typenav",
    version,
    about = "Type namespace navigator",
    long_about = "Presents the types of metadata registries as a navigable namespace hierarchy."
)]
pub struct TypenavCli {
    /// Path to the configuration file (defaults to ~/.typenav/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Separator used in paths, overriding the configuration file
    #[arg(long, global = true)]
    pub separator: Option<char>,

    /// Registry file to load, in addition to the configured ones
    #[arg(long = "registry", global = true, value_name = "FILE")]
    pub registries: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl TypenavCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the namespaces and types below a path
    #[command(name = "ls")]
    List(ListArgs),
    /// Describe the namespace or type at a path
    Item(PathArgs),
    /// Show the formatted members of a type
    #[command(name = "props")]
    Properties(PropertiesArgs),
    /// Check whether a path names a namespace or a type
    Exists(PathArgs),
    /// Read navigation commands from standard input
    Shell,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Namespace to list (defaults to the root)
    #[arg(default_value = "")]
    pub path: String,

    /// List every namespace below the path as well
    #[arg(short, long)]
    pub recurse: bool,

    /// Include types that are not exported
    #[arg(long)]
    pub force: bool,

    /// Print only child names
    #[arg(long)]
    pub names: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PropertiesArgs {
    pub path: String,

    /// Member names or wildcard patterns to include
    #[arg(long, num_args = 1..)]
    pub pick: Vec<String>,

    /// Include implemented interfaces
    #[arg(long)]
    pub interfaces: bool,

    /// Include applied attributes
    #[arg(long)]
    pub attributes: bool,

    /// Include enumeration values
    #[arg(long)]
    pub enum_values: bool,

    /// Leave out methods and properties
    #[arg(long)]
    pub no_members: bool,
}
