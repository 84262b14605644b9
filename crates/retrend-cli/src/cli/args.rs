use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "retrend")]
#[command(about = "Command-line client for the ReTrend marketplace")]
pub struct Cli {
    /// Print JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, short, global = true)]
    pub pretty: bool,

    /// Path to JSON config file (apiBaseUrl, dataDir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Backend reachability, session state and badge counts
    Status,

    /// Sign in with email and password
    Login {
        #[arg(long, short = 'e')]
        email: String,
        #[arg(long, short = 'p')]
        password: String,
    },

    /// Create an account (sign in afterwards with `login`)
    Register {
        #[arg(long, short = 'n')]
        name: String,
        #[arg(long, short = 'e')]
        email: String,
        #[arg(long, short = 'p')]
        password: String,
        /// Must match --password
        #[arg(long)]
        confirm: String,
    },

    /// Sign in with a Google identity token
    GoogleLogin {
        #[arg(long)]
        id_token: String,
    },

    /// Sign in with a verified phone identity token
    PhoneLogin {
        #[arg(long)]
        id_token: String,
        /// E.164 number, e.g. +919876543210
        #[arg(long)]
        phone: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Follow a conversation live; stdin lines are sent, Ctrl-D ends
    Chat {
        /// Other participant's email
        peer: String,
        /// Listing the conversation is about
        #[arg(long, short = 'l')]
        listing: String,
    },

    /// Send a single message
    Send {
        /// Other participant's email
        peer: String,
        /// Message text
        text: String,
        /// Listing the conversation is about
        #[arg(long, short = 'l')]
        listing: String,
    },

    /// Unread message and wishlist counts
    Unread,

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommand,
    },

    /// Listings for the saved location
    Products,

    /// Show or change the saved location
    Location {
        #[command(subcommand)]
        command: LocationCommand,
    },

    /// Resolve a client path against the current session
    Route {
        /// e.g. /chat/abc/seller@example.com
        path: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WishlistCommand {
    List,
    Add { product_id: String },
    Remove { product_id: String },
}

#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    Show,
    Set {
        /// Display name used as the listing filter
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "retrend",
            "send",
            "seller@example.com",
            "is it available?",
            "--listing",
            "abc123",
        ])
        .unwrap();
        match cli.command {
            Commands::Send {
                peer,
                text,
                listing,
            } => {
                assert_eq!(peer, "seller@example.com");
                assert_eq!(text, "is it available?");
                assert_eq!(listing, "abc123");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["retrend", "wishlist", "list", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Wishlist {
                command: WishlistCommand::List
            }
        ));
    }

    #[test]
    fn test_chat_requires_listing() {
        assert!(Cli::try_parse_from(["retrend", "chat", "seller@example.com"]).is_err());
    }

    #[test]
    fn test_parse_location_set() {
        let cli = Cli::try_parse_from(["retrend", "location", "set", "Pune, Maharashtra"]).unwrap();
        match cli.command {
            Commands::Location {
                command: LocationCommand::Set { name },
            } => assert_eq!(name, "Pune, Maharashtra"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_phone_login_flags() {
        let cli = Cli::try_parse_from([
            "retrend",
            "phone-login",
            "--id-token",
            "tok",
            "--phone",
            "+919876543210",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::PhoneLogin { .. }));
    }
}
