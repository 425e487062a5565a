use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

use navlink_bridge::{BridgeConfig, BridgeController, Cli, DemoFeed, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    log::info!("navlink-bridge {}", VERSION);

    // Reject a bad manual endpoint before anything starts.
    let manual_endpoint = args
        .endpoint
        .as_deref()
        .map(navlink_core::parse_endpoint)
        .transpose()
        .into_diagnostic()?;

    let config = BridgeConfig::from_cli(&args);

    Toplevel::new(move |s| async move {
        let controller = BridgeController::new(config);

        for (orig, shown) in &args.speed_map {
            log::info!("Speed mapping: {} km/h shown as {} km/h", orig, shown);
            controller.speeds().set_mapping(*orig, *shown);
        }
        if let Some(ip) = manual_endpoint {
            log::info!("Manual endpoint {} configured, discovery will update it", ip);
            controller.shared_state().adopt_endpoint(ip);
        }

        controller.start(&s);

        if args.demo {
            let feed = DemoFeed::new(controller.shared_state());
            s.start(SubsystemBuilder::new("DemoFeed", move |h| feed.run(h)));
        }
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(5))
    .await
    .map_err(Into::into)
}
