//! Command-level tests against a temporary JSON store

use clap::Parser;
use docpulse_cli::{commands, Cli, JsonFileStore};
use docpulse_core::{DocumentId, DocumentStore, Status};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("docs.json")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run a command on 2025-06-01 and return stdout
    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let store = self.store_path();
        let mut argv = vec![
            "docpulse",
            "--store",
            store.to_str().unwrap(),
            "--today",
            "2025-06-01",
        ];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        commands::run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn register(&self, name: &str, company: &str, expiry: &str) -> String {
        self.run(&[
            "register", name, "--category", "License", "--authority", "Registry",
            "--company", company, "--owner", "mallory", "--expiry", expiry,
            "--lead-time", "1W",
        ])
        .unwrap()
        .trim()
        .to_string()
    }

    fn status(&self, id: &str) -> Status {
        open(&self.store_path()).load(&DocumentId::new(id)).unwrap().status()
    }
}

fn open(path: &Path) -> JsonFileStore {
    JsonFileStore::open(path).unwrap()
}

#[test]
fn register_activate_and_show() {
    let ws = Workspace::new();
    let id = ws.register("Trade License", "Acme", "2025-12-31");
    assert!(id.starts_with("DOC-"));
    assert_eq!(ws.status(&id), Status::Draft);

    ws.run(&["activate", &id]).unwrap();
    let shown = ws.run(&["show", &id]).unwrap();

    assert!(shown.contains("Status:         Active"));
    assert!(shown.contains("Lead time:      1W (7 days)"));
    assert!(shown.contains("Remind from:    2025-12-24"));
    assert!(shown.contains("Allowed:        renew, mark-in-progress, revoke"));
}

#[test]
fn rejected_transition_is_an_error_and_changes_nothing() {
    let ws = Workspace::new();
    let id = ws.register("Trade License", "Acme", "2025-12-31");
    let before = fs::read_to_string(ws.store_path()).unwrap();

    let err = ws.run(&["renew", &id]).unwrap_err();
    assert!(err.to_string().contains("Cannot renew"));
    assert_eq!(fs::read_to_string(ws.store_path()).unwrap(), before);
}

#[test]
fn renew_and_print_chain() {
    let ws = Workspace::new();
    let id = ws.register("Trade License", "Acme", "2025-06-20");
    ws.run(&["activate", &id]).unwrap();

    let successor = ws.run(&["renew", &id]).unwrap().trim().to_string();
    ws.run(&["set-expiry", &successor, "2026-06-20"]).unwrap();
    ws.run(&["activate", &successor]).unwrap();

    let chain = ws.run(&["chain", &successor]).unwrap();
    let lines: Vec<&str> = chain.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("{}\tRenewed\tHistorical\t2025-06-20", id));
    assert_eq!(lines[1], format!("{}\tActive\tCurrent\t2026-06-20", successor));
}

#[test]
fn scan_writes_json_report_and_moves_documents() {
    let ws = Workspace::new();
    let late = ws.register("Health Permit", "Acme", "2025-05-30");
    let soon = ws.register("Trade License", "Acme", "2025-06-04");
    let later = ws.register("Lease", "Acme", "2025-09-01");
    for id in [&late, &soon, &later] {
        ws.run(&["activate", id]).unwrap();
    }

    let report = ws.path("report.json");
    let stdout = ws
        .run(&[
            "scan", "--company", "Acme", "--format", "json",
            "--output", report.to_str().unwrap(),
        ])
        .unwrap();
    assert!(stdout.is_empty());

    let logs: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let log = &logs[0];
    assert_eq!(log["company"], "Acme");
    assert_eq!(log["log_date"], "2025-06-01");
    assert_eq!(log["total_documents_flagged"], 2);
    assert_eq!(log["items"][0]["severity"], "Overdue");
    assert_eq!(log["items"][0]["days_to_expiry"], -2);
    assert_eq!(log["items"][1]["severity"], "Due Soon");
    assert_eq!(log["items"][1]["current_status"], "Active Soon to Expire");

    assert_eq!(ws.status(&late), Status::Expired);
    assert_eq!(ws.status(&soon), Status::ActiveSoonToExpire);
    assert_eq!(ws.status(&later), Status::Active);
}

#[test]
fn scan_all_companies_prints_one_log_each() {
    let ws = Workspace::new();
    for company in ["Globex", "Acme"] {
        let id = ws.register("Trade License", company, "2025-06-01");
        ws.run(&["activate", &id]).unwrap();
    }

    let stdout = ws.run(&["scan", "--all-companies", "--format", "json"]).unwrap();
    let logs: Value = serde_json::from_str(&stdout).unwrap();
    let companies: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["company"].as_str().unwrap())
        .collect();
    assert_eq!(companies, vec!["Acme", "Globex"]);
    assert_eq!(logs[0]["items"][0]["severity"], "Due Today");
}

#[test]
fn scan_needs_a_company() {
    let ws = Workspace::new();
    let err = ws.run(&["scan"]).unwrap_err();
    assert!(err.to_string().contains("No company to scan"));
}

#[test]
fn config_supplies_company_and_lead_time() {
    let ws = Workspace::new();
    let config = ws.path("docpulse.toml");
    fs::write(
        &config,
        "[scanner]\ncompany = \"Acme\"\n\n[defaults]\nlead_time = \"Custom\"\ncustom_lead_days = 45\n",
    )
    .unwrap();
    let config = config.to_str().unwrap();

    let id = ws
        .run(&[
            "--config", config, "register", "Fire Certificate", "--category", "Safety",
            "--authority", "Civil Defence", "--owner", "niaj", "--expiry", "2025-07-01",
        ])
        .unwrap()
        .trim()
        .to_string();
    ws.run(&["activate", &id]).unwrap();

    let report = ws.run(&["--config", config, "scan"]).unwrap();
    assert!(report.contains("Company:   Acme"));
    assert!(report.contains("Fire Certificate"));
    assert!(report.contains("in 30 days"));
}
