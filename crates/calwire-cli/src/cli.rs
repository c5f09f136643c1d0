//! Command-line interface definition.

use std::path::PathBuf;

use calwire_protocol::Depth;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

/// calwire - talk CalDAV from the shell
#[derive(Debug, Parser)]
#[command(name = "calwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(long, env = "CALWIRE_URL")]
    pub url: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the children of a collection
    Ls {
        /// Collection path (defaults to the base URL)
        path: Option<String>,

        /// Only list calendars
        #[arg(long)]
        calendars: bool,
    },

    /// Fetch properties of a resource
    Props {
        /// Resource path
        path: String,

        /// Property as prefix:name, e.g. D:displayname (can be repeated)
        #[arg(long = "prop", action = clap::ArgAction::Append)]
        props: Vec<String>,

        /// How deep to look
        #[arg(long, value_enum, default_value = "0")]
        depth: DepthArg,
    },

    /// Find events in a time range
    Search {
        /// Calendar path
        calendar: String,

        /// Range start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,

        /// Range end (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },

    /// Create a calendar
    Mkcalendar {
        /// Display name
        name: String,

        /// Parent collection path (defaults to the base URL)
        #[arg(long)]
        parent: Option<String>,

        /// Resource name (a UUID when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Upload an iCalendar file as a new event
    Put {
        /// Calendar path
        calendar: String,

        /// The .ics file to upload
        file: PathBuf,

        /// Resource name without .ics (a UUID when omitted)
        #[arg(long)]
        id: Option<String>,
    },
}

/// `Depth` header choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    #[value(name = "0")]
    Zero,
    #[value(name = "1")]
    One,
    #[value(name = "infinity")]
    Infinity,
}

impl From<DepthArg> for Depth {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Zero => Depth::Zero,
            DepthArg::One => Depth::One,
            DepthArg::Infinity => Depth::Infinity,
        }
    }
}
