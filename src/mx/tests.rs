use std::cell::Cell;
use std::net::{IpAddr, Ipv4Addr};

use super::{DnsError, DnsLookup, MailServer, MxRecord, resolve_mail_servers, resolver};

type MxFn = dyn Fn(&str) -> Result<Vec<MxRecord>, DnsError>;
type AFn = dyn Fn(&str) -> Result<Vec<IpAddr>, DnsError>;

struct StubResolver {
    on_mx: Box<MxFn>,
    on_a: Box<AFn>,
    a_calls: Cell<usize>,
}

impl StubResolver {
    fn new<M, A>(on_mx: M, on_a: A) -> Self
    where
        M: Fn(&str) -> Result<Vec<MxRecord>, DnsError> + 'static,
        A: Fn(&str) -> Result<Vec<IpAddr>, DnsError> + 'static,
    {
        Self {
            on_mx: Box::new(on_mx),
            on_a: Box::new(on_a),
            a_calls: Cell::new(0),
        }
    }
}

impl DnsLookup for StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        (self.on_mx)(domain)
    }

    fn lookup_a(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        self.a_calls.set(self.a_calls.get() + 1);
        (self.on_a)(domain)
    }
}

fn localhost() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = resolver::normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, DnsError::EmptyDomain));
}

#[test]
fn mx_records_are_sorted_and_deduped() {
    let stub = StubResolver::new(
        |domain| {
            assert_eq!(domain, "example.com");
            Ok(vec![
                MxRecord::new(20, "mx2.example.com"),
                MxRecord::new(10, "mx1.example.com"),
                MxRecord::new(10, "mx1.example.com"),
                MxRecord::new(30, "mx3.example.com"),
            ])
        },
        |_| panic!("A lookup must not run when MX records exist"),
    );

    let servers = resolve_mail_servers(&stub, "Example.COM");
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0].exchange(), Some("mx1.example.com"));
    assert_eq!(servers[2].exchange(), Some("mx3.example.com"));
    assert_eq!(stub.a_calls.get(), 0);
}

#[test]
fn falls_back_to_a_records() {
    let stub = StubResolver::new(|_| Ok(Vec::new()), |_| Ok(vec![localhost()]));

    let servers = resolve_mail_servers(&stub, "example.com");
    assert_eq!(servers, vec![MailServer::Address(localhost())]);
    assert_eq!(servers[0].exchange(), None);
    assert_eq!(stub.a_calls.get(), 1);
}

#[test]
fn mx_failure_still_tries_a_records() {
    let stub = StubResolver::new(|_| Err(DnsError::EmptyDomain), |_| Ok(vec![localhost()]));

    let servers = resolve_mail_servers(&stub, "example.com");
    assert_eq!(servers.len(), 1);
}

#[test]
fn failures_fold_to_empty() {
    let stub = StubResolver::new(|_| Err(DnsError::EmptyDomain), |_| Err(DnsError::EmptyDomain));

    assert!(resolve_mail_servers(&stub, "example.com").is_empty());
}

#[test]
fn unresolvable_domain_skips_lookup() {
    let stub = StubResolver::new(
        |_| panic!("no MX lookup for an empty domain"),
        |_| panic!("no A lookup for an empty domain"),
    );

    assert!(resolve_mail_servers(&stub, "").is_empty());
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}

#[test]
fn zero_timeout_is_ignored() {
    let opts = super::DnsOptions::default().with_timeout(std::time::Duration::ZERO);
    assert_eq!(opts.timeout, std::time::Duration::from_secs(5));
    assert_eq!(opts.attempts, 1);
}

#[test]
fn dns_options_reach_resolver_opts() {
    let options = super::DnsOptions {
        use_system_conf: false,
        ..Default::default()
    }
    .with_timeout(std::time::Duration::from_millis(300))
    .with_name_servers([IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))]);
    let (config, opts) = super::SystemDns::new(options).resolver_opts();

    assert_eq!(opts.timeout, std::time::Duration::from_millis(300));
    assert_eq!(opts.attempts, 1);
    assert!(!config.name_servers().is_empty());
    assert!(
        config
            .name_servers()
            .iter()
            .all(|ns| ns.socket_addr.ip() == IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))
                && ns.socket_addr.port() == 53)
    );
}

#[test]
fn attempts_never_drop_to_zero() {
    let options = super::DnsOptions {
        attempts: 0,
        use_system_conf: false,
        ..Default::default()
    };
    let (_, opts) = super::SystemDns::new(options).resolver_opts();
    assert_eq!(opts.attempts, 1);
}

#[test]
fn error_messages_name_the_failure() {
    assert_eq!(DnsError::EmptyDomain.to_string(), "no domain to resolve");
}
