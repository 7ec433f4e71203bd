//! Command-line arguments

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use docpulse_core::LeadTimeClass;
use std::path::PathBuf;

use crate::reporter::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "docpulse")]
#[command(version, about = "Track document expiry and run the daily renewal scan")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON document store (overrides store.path from the config)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new Draft document
    Register(RegisterArgs),
    /// Show a document and the operations allowed on it
    Show { id: String },
    /// Set the expiry date of a Draft document
    SetExpiry { id: String, date: NaiveDate },
    /// Set the renewal lead time of a Draft document
    SetLeadTime {
        id: String,
        /// 1D, 1W, 1M, 3M or Custom
        class: LeadTimeClass,
        /// Day count, required for Custom
        #[arg(long)]
        days: Option<i64>,
    },
    /// Draft → Active
    Activate { id: String },
    /// Renew an Active document, creating its Draft successor
    Renew { id: String },
    /// Record that a renewal has started
    MarkInProgress { id: String },
    /// Undo mark-in-progress
    Revert { id: String },
    /// Revoke an Active document or cancel any other
    Revoke { id: String },
    /// Print the renewal chain containing a document, oldest first
    Chain { id: String },
    /// Run the renewal scan
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Document name, e.g. "Trade License"
    pub name: String,

    #[arg(long)]
    pub category: String,

    /// Issuing authority
    #[arg(long)]
    pub authority: String,

    /// Defaults to scanner.company from the config
    #[arg(long)]
    pub company: Option<String>,

    /// Person responsible for renewal
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub reference_no: Option<String>,

    #[arg(long)]
    pub issue_date: Option<NaiveDate>,

    #[arg(long)]
    pub expiry: Option<NaiveDate>,

    /// Defaults to defaults.lead_time from the config
    #[arg(long)]
    pub lead_time: Option<LeadTimeClass>,

    #[arg(long)]
    pub lead_days: Option<i64>,

    #[arg(long)]
    pub not_renewable: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Company to scan (defaults to scanner.company from the config)
    #[arg(long, conflicts_with = "all_companies")]
    pub company: Option<String>,

    /// Scan every company with candidate documents
    #[arg(long)]
    pub all_companies: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
