use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::conversation::ConversationKind;

#[derive(Debug, Parser)]
#[command(name = "nova", about = "Nova messaging client (CLI + summary service)")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List conversations, pinned first
    Conversations {
        /// Only conversations whose title contains this text
        #[arg(long)]
        query: Option<String>,
        /// all, unread, groups or channels
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the message thread of a conversation
    Messages { conversation_id: String },
    /// Send a text message
    Send {
        conversation_id: String,
        content: String,
        /// Id of the message being replied to
        #[arg(long)]
        reply_to: Option<String>,
        /// Self-destruct hint in seconds (5, 30, 60, 300, 3600 or 86400)
        #[arg(long)]
        self_destruct: Option<u32>,
    },
    /// Compose messages line by line from stdin
    Compose { conversation_id: String },
    /// Send a voice note placeholder of the given length
    Voice {
        conversation_id: String,
        duration_secs: u32,
    },
    /// React to a message with an emoji
    React {
        conversation_id: String,
        message_id: String,
        emoji: String,
    },
    /// Toggle the bookmark flag of a message
    Bookmark {
        conversation_id: String,
        message_id: String,
    },
    /// Create a direct conversation, group or channel
    Create {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long)]
        name: Option<String>,
        /// Member user id; repeat for several members
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Search message content in a conversation
    Search {
        conversation_id: String,
        query: String,
        /// all, media, links or files
        #[arg(long, default_value = "all")]
        filter: String,
        /// Highlight the match this many steps after the first
        #[arg(long, default_value_t = 0, conflicts_with = "previous")]
        next: usize,
        /// Highlight the match this many steps before the first
        #[arg(long, default_value_t = 0)]
        previous: usize,
    },
    /// Follow a conversation and reprint it on every change
    Watch { conversation_id: String },
    /// Ask the summary function for an AI summary of a conversation
    Summarize { conversation_id: String },
    /// Show or update the signed-in user's profile
    Profile {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// List all known profiles
    People,
    /// Run the summary HTTP service
    ServeSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Direct,
    Group,
    Channel,
}

impl From<KindArg> for ConversationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Direct => Self::Direct,
            KindArg::Group => Self::Group,
            KindArg::Channel => Self::Channel,
        }
    }
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Conversations {
                query: None,
                filter: None,
            })
    }
}
