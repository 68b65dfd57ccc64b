//! The scrub run: startup checks, then the filtering loop with progress output.

use anyhow::Result;
use scrub_core::classify::Classifier;
use scrub_core::config;
use scrub_core::fetch_head::{self, CurlInspector, HttpSettings};
use scrub_core::media_probe::FfprobeInspector;
use scrub_core::scrub;

use super::Cli;

pub async fn run(cli: Cli) -> Result<()> {
    scrub::ensure_input_exists(&cli.input)?;

    let mut cfg = match &cli.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    cli.apply_to(&mut cfg);
    tracing::debug!("effective config: {:?}", cfg);

    fetch_head::check_http_support()?;
    let media = if cfg.deep_probe {
        let found = FfprobeInspector::detect(&cfg.probe_tool, cfg.probe_timeout()).await;
        match &found {
            Some(probe) => println!("Deep probe: {}", probe.tool()),
            None => println!(
                "Deep probe disabled: {} not available; falling back to content-type rules.",
                cfg.probe_tool
            ),
        }
        found
    } else {
        None
    };

    let classifier = Classifier::new(CurlInspector::new(HttpSettings::from_config(&cfg)), media)
        .with_deferred_octet_stream(cfg.defer_octet_stream);

    let output = cli.output_path();
    println!("Checking {} -> {}", cli.input.display(), output.display());

    let summary = tokio::select! {
        res = scrub::scrub_playlist(&cli.input, &output, &classifier, |r| println!("{r}")) => res?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted by user");
            anyhow::bail!("interrupted; {} left untouched", output.display());
        }
    };

    println!();
    println!("Total:    {}", summary.total);
    println!("Accepted: {}", summary.accepted);
    println!("Rejected: {}", summary.rejected());
    println!("Output:   {}", output.display());
    Ok(())
}
