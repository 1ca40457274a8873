//! route-verify - wait for a route to converge on a SONiC device
//!
//! Polls one device until the route described by an expected-state JSON
//! file is installed (or removed), then prints the last observed state.
//!
//! Exit codes: 0 converged, 1 timed out, 2 error.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sonic_route_verify::config::DEFAULT_CONFIG_PATH;
use sonic_route_verify::{
    verify_route, OutputFormat, Presence, RouteCheck, RouteRecord, RouteSource,
    RouteVerifyConfig, VerificationContext,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "route-verify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device to query
    #[arg(short = 'd', long, default_value = "localhost")]
    device: String,

    /// Dump format (rib, fib, kernel, running-config, appl-db)
    #[arg(short = 'f', long, default_value = "rib")]
    format: OutputFormat,

    /// Expected route state (JSON mapping)
    #[arg(short = 'e', long)]
    expected: PathBuf,

    /// Wait for the route to disappear instead
    #[arg(long)]
    absent: bool,

    /// Only consider next-hops of this route type
    #[arg(long)]
    route_type: Option<String>,

    /// VRF of the route
    #[arg(long)]
    vrf: Option<String>,

    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Interval between polls in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Number of polls before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Remote user for ssh
    #[arg(long)]
    ssh_user: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("route-verify failed: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = RouteVerifyConfig::load_or_default(&args.config)?;
    if let Some(interval_ms) = args.interval_ms {
        config.poll.interval_ms = interval_ms;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.poll.max_attempts = max_attempts;
    }
    if args.ssh_user.is_some() {
        config.exec.ssh_user = args.ssh_user.clone();
    }
    config.validate()?;

    let text = fs::read_to_string(&args.expected)
        .with_context(|| format!("Failed to read {}", args.expected.display()))?;
    let mapping: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", args.expected.display()))?;
    let expected = RouteRecord::from_mapping(&mapping)?;

    let policy = config.poll_policy();
    let mut ctx = VerificationContext::new(policy);
    if let Some(vrf) = &args.vrf {
        ctx = ctx.with_vrf(vrf);
    }
    if let Some(route_type) = args.route_type.as_deref() {
        ctx = ctx.with_route_type_filter(RouteSource::from(route_type));
    }
    let desired = if args.absent {
        Presence::Absent
    } else {
        Presence::Present
    };

    info!(
        device = %args.device,
        format = %args.format,
        prefix = %expected.prefix(),
        %desired,
        interval = ?policy.interval,
        max_attempts = policy.max_attempts,
        budget = ?policy.budget(),
        "Starting route verification"
    );

    let source = config.output_source();
    let check = RouteCheck::new(expected, args.format);
    let verification = verify_route(&source, &args.device, &check, desired, &ctx).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&verification.observed_mapping())?
    );
    if verification.converged {
        info!(attempts = verification.attempts, "Route converged");
    } else {
        error!(
            attempts = verification.attempts,
            diff = %verification.comparison,
            "Route did not converge"
        );
    }
    Ok(verification.converged)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
