use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "quill - a text snippet expansion tool",
    long_about = "quill watches what you type and replaces configured triggers with \
                  expanded text, or with the result of a dynamic Lua snippet."
)]
pub struct Quill {
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new snippet
    Add {
        #[clap(long, short = 'k', help = "Trigger text (or pattern with --regex)")]
        key: String,

        #[clap(long, short = 'v', help = "Replacement text, or Lua code with --dynamic")]
        value: String,

        #[clap(long, help = "Interpret the trigger as a regular expression")]
        regex: bool,

        #[clap(long, help = "Evaluate the value as a Lua function of the matched text")]
        dynamic: bool,
    },
    /// Delete a snippet by id
    Delete {
        #[clap(help = "Id of the snippet to delete")]
        id: u64,
    },
    /// Replace the trigger or content of an existing snippet
    Update {
        #[clap(help = "Id of the snippet to update")]
        id: u64,

        #[clap(long, short = 'k', help = "New trigger")]
        key: Option<String>,

        #[clap(long, short = 'v', help = "New replacement text or code")]
        value: Option<String>,
    },
    /// Re-enable a snippet
    Activate {
        #[clap(help = "Id of the snippet to activate")]
        id: u64,
    },
    /// Disable a snippet without deleting it
    Deactivate {
        #[clap(help = "Id of the snippet to deactivate")]
        id: u64,
    },
    /// List all snippets
    List,
    /// Start the expansion daemon
    Start,
    /// Stop the expansion daemon
    Stop,
    /// Check the status of the expansion daemon
    Status,
    // Hidden command used internally to run the daemon worker
    #[clap(hide = true)]
    DaemonWorker,
}
