//! Command execution

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use docpulse_core::{
    Clock, Config, DailyRenewalJob, Document, DocumentId, DocumentTracker, FixedClock,
    NewDocument, Operation, RenewalLeadTime, RenewalLog, SystemClock, TracingNotifier,
};
use std::io::Write;
use tracing::info;

use crate::cli::{Cli, Command, RegisterArgs, ScanArgs};
use crate::reporter::Reporter;
use crate::store::JsonFileStore;

pub type Tracker = DocumentTracker<JsonFileStore, FixedClock>;

/// Load configuration: an explicit `--config` path, otherwise defaults
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

/// Open the store named on the command line or in the config, pinned to
/// `--today` when given
pub fn open_tracker(cli: &Cli, config: &Config) -> Result<Tracker> {
    let path = cli.store.as_ref().unwrap_or(&config.store.path);
    let store = JsonFileStore::open(path)?;
    let today = cli.today.unwrap_or_else(|| SystemClock.today());
    Ok(DocumentTracker::with_clock(store, FixedClock(today)))
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(&cli)?;
    let mut tracker = open_tracker(&cli, &config)?;

    match cli.command {
        Command::Register(args) => {
            let new = new_document(args, &config)?;
            let id = tracker.register(new)?;
            writeln!(out, "{}", id)?;
        }
        Command::Show { id } => {
            let id = DocumentId::new(id);
            let document = tracker.load(&id)?;
            let allowed = tracker.allowed_operations(&id)?;
            describe(out, &document, tracker.today())?;
            let names: Vec<&str> = allowed.into_iter().map(command_name).collect();
            writeln!(out, "Allowed:        {}", names.join(", "))?;
        }
        Command::SetExpiry { id, date } => {
            let document = tracker.set_expiry_date(&DocumentId::new(id), date)?;
            describe(out, &document, tracker.today())?;
        }
        Command::SetLeadTime { id, class, days } => {
            let lead_time = RenewalLeadTime::resolve(class, days)?;
            let document = tracker.set_lead_time(&DocumentId::new(id), lead_time)?;
            describe(out, &document, tracker.today())?;
        }
        Command::Activate { id } => {
            let document = tracker.activate(&DocumentId::new(id))?;
            describe(out, &document, tracker.today())?;
        }
        Command::Renew { id } => {
            let successor = tracker.renew(&DocumentId::new(id))?;
            writeln!(out, "{}", successor)?;
        }
        Command::MarkInProgress { id } => {
            let document = tracker.mark_renewal_in_progress(&DocumentId::new(id))?;
            describe(out, &document, tracker.today())?;
        }
        Command::Revert { id } => {
            let document = tracker.revert_renewal_status(&DocumentId::new(id))?;
            describe(out, &document, tracker.today())?;
        }
        Command::Revoke { id } => {
            let document = tracker.revoke_or_cancel(&DocumentId::new(id))?;
            describe(out, &document, tracker.today())?;
        }
        Command::Chain { id } => {
            for document in tracker.renewal_chain(&DocumentId::new(id))? {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    document.id,
                    document.status(),
                    document.lifecycle_state(),
                    document
                        .expiry_date()
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_string())
                )?;
            }
        }
        Command::Scan(args) => {
            let logs = scan(tracker, &args, &config)?;
            let reporter = Reporter::new(args.format);
            match &args.output {
                Some(path) => {
                    reporter.write_to_file(&logs, path)?;
                    info!(path = %path.display(), "Report written");
                }
                None => out.write_all(reporter.format_logs(&logs)?.as_bytes())?,
            }
        }
    }
    Ok(())
}

fn scan(tracker: Tracker, args: &ScanArgs, config: &Config) -> Result<Vec<RenewalLog>> {
    if args.all_companies {
        let mut job = DailyRenewalJob::new(tracker, TracingNotifier);
        return Ok(job.run_all_companies()?);
    }

    let company = match args.company.as_ref().or(config.scanner.company.as_ref()) {
        Some(company) => company.clone(),
        None => bail!("No company to scan: pass --company, --all-companies or set scanner.company"),
    };
    let mut job = DailyRenewalJob::new(tracker, TracingNotifier);
    let log = job
        .run_daily_scan(&company)
        .with_context(|| format!("Renewal scan failed for {}", company))?;
    Ok(vec![log])
}

fn new_document(args: RegisterArgs, config: &Config) -> Result<NewDocument> {
    let company = match args.company.or_else(|| config.scanner.company.clone()) {
        Some(company) => company,
        None => bail!("No company given: pass --company or set scanner.company"),
    };
    let lead_time = match args.lead_time {
        Some(class) => RenewalLeadTime::resolve(class, args.lead_days)?,
        None => config.defaults.lead_time()?,
    };

    let mut new = NewDocument::new(&args.name, &args.category, &args.authority, &company, &args.owner)
        .with_lead_time(lead_time)
        .with_renewable(!args.not_renewable);
    new.reference_no = args.reference_no;
    new.department = args.department;
    new.issue_date = args.issue_date;
    new.expiry_date = args.expiry;
    Ok(new)
}

/// Subcommand that performs `operation`
fn command_name(operation: Operation) -> &'static str {
    match operation {
        Operation::SetExpiryDate => "set-expiry",
        Operation::SetLeadTime => "set-lead-time",
        Operation::Activate => "activate",
        Operation::Renew => "renew",
        Operation::MarkRenewalInProgress => "mark-in-progress",
        Operation::RevertRenewalStatus => "revert",
        Operation::RevokeOrCancel => "revoke",
    }
}

fn describe(out: &mut dyn Write, document: &Document, today: NaiveDate) -> Result<()> {
    let optional_date = |date: Option<NaiveDate>| {
        date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };

    writeln!(out, "Document:       {}", document.id)?;
    writeln!(out, "Name:           {}", document.document_name)?;
    writeln!(out, "Category:       {}", document.category)?;
    writeln!(out, "Authority:      {}", document.authority)?;
    writeln!(out, "Company:        {}", document.company)?;
    writeln!(out, "Owner:          {}", document.owner_person)?;
    writeln!(out, "Status:         {}", document.status())?;
    writeln!(out, "Lifecycle:      {}", document.lifecycle_state())?;
    writeln!(out, "Issue date:     {}", optional_date(document.issue_date))?;
    writeln!(out, "Expiry date:    {}", optional_date(document.expiry_date()))?;
    writeln!(
        out,
        "Lead time:      {} ({} days)",
        document.renewal_lead_time().class(),
        document.renewal_lead_time_days()
    )?;
    writeln!(out, "Remind from:    {}", optional_date(document.remind_from_date()))?;
    if let Some(days) = document.days_remaining(today) {
        writeln!(out, "Days remaining: {}", days)?;
    }
    writeln!(out, "Renewals:       {}", document.renewal_count())?;
    Ok(())
}
