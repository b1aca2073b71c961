use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mailqualify_lib::{DnsOptions, QualifyOptions};

#[derive(Parser)]
#[command(name = "mailqualify-cli")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// répertoire contenant disposable/whitelisted/blacklisted_email_domains.txt
    #[arg(long)]
    pub lists_dir: Option<PathBuf>,

    /// liste de domaines jetables (remplace celle de --lists-dir)
    #[arg(long)]
    pub disposable: Option<PathBuf>,

    /// liste blanche (remplace celle de --lists-dir)
    #[arg(long)]
    pub whitelist: Option<PathBuf>,

    /// liste noire (remplace celle de --lists-dir)
    #[arg(long)]
    pub blacklist: Option<PathBuf>,

    /// rejette si aucun MX (ni A)
    #[arg(long)]
    pub require_mx: bool,

    /// rejette domaines et serveurs MX jetables
    #[arg(long)]
    pub reject_disposable: bool,

    /// rejette les domaines jetables, sans DNS
    #[arg(long)]
    pub reject_disposable_domain: bool,

    /// rejette les adresses jetables sauf domaine en liste blanche
    #[arg(long)]
    pub reject_disposable_unless_whitelisted: bool,

    /// rejette les domaines en liste noire
    #[arg(long)]
    pub reject_blacklisted: bool,

    /// rejette le sous-adressage (user+tag@...)
    #[arg(long)]
    pub reject_subaddressed: bool,

    /// chaque entrée est une liste séparée par des virgules
    #[arg(long)]
    pub multiple: bool,

    /// aucune requête DNS (incompatible avec les contrôles MX)
    #[arg(long)]
    pub no_dns: bool,

    /// timeout DNS par requête (ms)
    #[arg(long = "dns-timeout", default_value_t = 5_000)]
    pub dns_timeout_ms: u64,

    /// serveur DNS à interroger à la place de la config système (répétable)
    #[arg(long = "dns-server", value_name = "IP")]
    pub dns_servers: Vec<IpAddr>,
}

#[derive(Subcommand)]
pub enum Commands {
    Validate {
        /// adresse(s) à qualifier
        #[arg(required = true)]
        emails: Vec<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn qualify_options(&self) -> Result<QualifyOptions> {
        let options = QualifyOptions {
            mx: self.require_mx,
            disposable: self.reject_disposable,
            disposable_domain: self.reject_disposable_domain,
            disposable_with_whitelist: self.reject_disposable_unless_whitelisted,
            blacklist: self.reject_blacklisted,
            disallow_subaddressing: self.reject_subaddressed,
            multiple: self.multiple,
        };
        if self.no_dns && needs_dns(&options) {
            bail!(
                "--no-dns cannot be combined with --require-mx, --reject-disposable \
                 or --reject-disposable-unless-whitelisted"
            );
        }
        Ok(options)
    }

    pub fn dns_options(&self) -> DnsOptions {
        DnsOptions::default()
            .with_timeout(Duration::from_millis(self.dns_timeout_ms))
            .with_name_servers(self.dns_servers.iter().copied())
    }
}

fn needs_dns(options: &QualifyOptions) -> bool {
    options.mx || options.disposable || options.disposable_with_whitelist
}
