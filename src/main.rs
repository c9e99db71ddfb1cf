use anyhow::Context;
use clap::Parser;
use tracing::error;

use shape_graph::{app, config::Config, observability};

fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(String::as_str)
            })
            .unwrap_or("unknown panic payload");

        if let Some(location) = panic_info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                message,
                "panic occurred"
            );
        } else {
            error!(message, "panic occurred without location information");
        }
    }));

    observability::init().context("failed to initialize tracing")?;
    let plan = Config::parse()
        .resolve()
        .context("failed to load configuration")?;

    if let Err(error) = app::run(&plan) {
        error!(error = ?error, "shape graph build failed");
        return Err(error);
    }
    Ok(())
}
