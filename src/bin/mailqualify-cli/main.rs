mod args;
mod lists;
mod output;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use mailqualify_lib::{AddressValidator, MailboxParser, SystemDns};

use args::{Cli, Commands};
use output::OutputRow;

#[cfg(feature = "with-tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    #[cfg(feature = "with-tracing")]
    init_tracing();

    let cli = Cli::parse();
    let options = cli.qualify_options()?;
    let domain_lists = lists::load(&cli)?;
    let dns = SystemDns::new(cli.dns_options());

    let inputs: Vec<String> = if cli.stdin {
        let mut lines = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        lines
    } else if let Some(Commands::Validate { emails }) = &cli.cmd {
        emails.clone()
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    let mut rows = Vec::new();
    for input in &inputs {
        for address in options.split_input(input) {
            let validator = AddressValidator::with_parts(address, &domain_lists, &MailboxParser, &dns);
            let rejection = options.evaluate(&validator);
            rows.push(OutputRow::new(validator.summary(!cli.no_dns), rejection));
        }
    }

    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 OK, 2 rejets, 1 fatal
    if output::any_rejected(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
