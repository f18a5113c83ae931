//! sbom-audit: SBOM quality, compliance, and policy audit tool
//!
//! Audits CycloneDX and SPDX SBOMs against NTIA minimum elements and
//! organization allow/deny and freshness policy.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use sbom_audit::reports::{render_json, OutputTarget};
use sbom_audit::{
    exit_codes, parse_sbom, reports, AuditOptions, ConsoleObserver, PolicyStore, SbomAuditor,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sbom-audit")]
#[command(version)]
#[command(about = "Audit SBOM quality, compliance, and policy", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  SBOM meets the NTIA minimum elements
    1  SBOM is not compliant
    2  Input missing or unparsable (no report produced)

EXAMPLES:
    # Audit an SBOM, verbose output
    sbom-audit sbom.spdx.json --verbose

    # Enforce PURL presence and a license deny list, offline
    sbom-audit bom.cdx.json --purlcheck --deny deny.txt --offline

    # Machine-readable report for CI
    sbom-audit sbom.spdx.json -o audit.json")]
struct Cli {
    /// SBOM file to audit (CycloneDX or SPDX JSON)
    #[arg(required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Operate in offline mode (skip all registry lookups)
    #[arg(long, env = "SBOM_AUDIT_OFFLINE")]
    offline: bool,

    /// Check for CPE specification on each package
    #[arg(long)]
    cpecheck: bool,

    /// Check for PURL specification on each package
    #[arg(long)]
    purlcheck: bool,

    /// Disable the SPDX license identifier checks
    #[arg(long)]
    disable_license_check: bool,

    /// Minimum age of a package release in days before it is trusted
    #[arg(long, default_value = "0", value_name = "DAYS")]
    age: i64,

    /// Maximum age of a non-latest package release in years
    #[arg(long, default_value = "2", value_name = "YEARS")]
    maxage: i64,

    /// Allow list file
    #[arg(long, value_name = "FILE")]
    allow: Option<PathBuf>,

    /// Deny list file
    #[arg(long, value_name = "FILE")]
    deny: Option<PathBuf>,

    /// Verbose reporting (show passing checks too)
    #[arg(short, long)]
    verbose: bool,

    /// Add debug information
    #[arg(long)]
    debug: bool,

    /// Disable colored output (also respects NO_COLOR env)
    #[arg(long)]
    no_color: bool,

    /// Write the JSON audit report to a file
    #[arg(short = 'o', long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "sbom_audit=debug" } else { "sbom_audit=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return;
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("[ERROR] {err:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let Some(input) = cli.input else {
        bail!("SBOM file must be specified");
    };

    // No partial report on unreadable input: parse before any output.
    let sbom =
        parse_sbom(&input).with_context(|| format!("cannot audit {}", input.display()))?;

    let mut policy = PolicyStore::with_age_limits(cli.age, cli.maxage);
    if let Some(path) = &cli.allow {
        policy.load(path, true);
    }
    if let Some(path) = &cli.deny {
        policy.load(path, false);
    }

    let options = AuditOptions {
        verbose: cli.verbose,
        offline: cli.offline,
        cpe_check: cli.cpecheck,
        purl_check: cli.purlcheck,
        license_check: !cli.disable_license_check,
    };

    let observer = ConsoleObserver::new(reports::should_use_color(cli.no_color));
    let auditor = SbomAuditor::new(options, policy).with_observer(Box::new(observer));

    #[cfg(feature = "registry")]
    let auditor = {
        use sbom_audit::{RegistryClient, RegistryConfig};
        auditor.with_lookup(Box::new(RegistryClient::new(RegistryConfig::default())))
    };

    let mut auditor = auditor;
    let outcome = auditor.audit(&sbom);

    if let Some(path) = cli.output_file {
        let content = render_json(&outcome, &input)?;
        reports::write_output(&content, &OutputTarget::File(path))?;
    }

    Ok(if outcome.compliant {
        exit_codes::COMPLIANT
    } else {
        exit_codes::NOT_COMPLIANT
    })
}
