#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
use mailqualify_lib::{AddressSummary, MailServer, Rejection};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct OutputRow {
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub summary: AddressSummary,
    pub accepted: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rejection: Option<String>,
}

impl OutputRow {
    pub fn new(summary: AddressSummary, rejection: Option<Rejection>) -> Self {
        Self {
            summary,
            accepted: rejection.is_none(),
            rejection: rejection.map(|r| r.to_string()),
        }
    }
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_rejected(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.accepted)
}

fn write_human(rows: &[OutputRow]) -> Result<()> {
    for row in rows {
        print!("{}", human_block(row));
    }
    Ok(())
}

fn human_block(row: &OutputRow) -> String {
    let mut out = match &row.rejection {
        None => format!("[OK]       {}\n", row.summary.address),
        Some(rejection) => format!("[REJECTED] {rejection}\n"),
    };
    out.push_str(&format!("        flags: {}\n", format_flags(&row.summary)));
    if let Some(servers) = &row.summary.mail_servers
        && !servers.is_empty()
    {
        out.push_str(&format!("        mx: {}\n", format_servers(servers, ", ")));
    }
    out
}

fn opt_str(opt: Option<bool>) -> &'static str {
    match opt {
        Some(true) => "true",
        Some(false) => "false",
        None => "-",
    }
}

pub fn format_flags(summary: &AddressSummary) -> String {
    [
        format!("valid={}", summary.valid),
        format!("subaddressed={}", summary.subaddressed),
        format!("disposable={}", opt_str(summary.disposable)),
        format!("disposable_domain={}", summary.disposable_domain),
        format!(
            "disposable_mx={}",
            opt_str(summary.disposable_mx_server)
        ),
        format!("whitelisted={}", summary.whitelisted),
        format!("blacklisted={}", summary.blacklisted),
        format!("valid_mx={}", opt_str(summary.valid_mx)),
    ]
    .join(", ")
}

fn server_label(server: &MailServer) -> String {
    match server {
        MailServer::Exchange(record) => format!("{}:{}", record.preference, record.exchange),
        MailServer::Address(ip) => ip.to_string(),
    }
}

fn format_servers(servers: &[MailServer], sep: &str) -> String {
    servers
        .iter()
        .map(server_label)
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 13] = [
    "address",
    "accepted",
    "rejection",
    "valid",
    "reasons",
    "subaddressed",
    "disposable",
    "disposable_domain",
    "disposable_mx_server",
    "whitelisted",
    "blacklisted",
    "valid_mx",
    "mail_servers",
];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &OutputRow) -> Vec<String> {
    let s = &row.summary;
    let empty_opt = |opt: Option<bool>| match opt {
        Some(v) => v.to_string(),
        None => String::new(),
    };
    vec![
        s.address.clone(),
        row.accepted.to_string(),
        row.rejection.clone().unwrap_or_default(),
        s.valid.to_string(),
        s.reasons.join("|"),
        s.subaddressed.to_string(),
        empty_opt(s.disposable),
        s.disposable_domain.to_string(),
        empty_opt(s.disposable_mx_server),
        s.whitelisted.to_string(),
        s.blacklisted.to_string(),
        empty_opt(s.valid_mx),
        s.mail_servers
            .as_deref()
            .map(|servers| format_servers(servers, ";"))
            .unwrap_or_default(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
