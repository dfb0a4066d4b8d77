//! `lifeline config` handlers

use std::error::Error;
use std::fs;

use crate::cli::{ConfigCheckArgs, ConfigInitArgs};
use crate::config::{LifelineConfig, EXAMPLE_CONFIG};
use crate::controller::Mode;

/// Write the annotated example config. Returns the report to print.
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;
    let config: LifelineConfig = toml::from_str(EXAMPLE_CONFIG)?;

    Ok(format!(
        "✓ Configuration file created: {}\n{}\n  Edit [stream] and [prediction] to point at your device and prediction service.",
        args.output.display(),
        summary(&config)
    ))
}

/// Load the file plus `LIFELINE_*` overrides and validate the result.
pub fn handle_config_check(args: &ConfigCheckArgs) -> Result<String, Box<dyn Error>> {
    let config = LifelineConfig::load(Some(&args.config))?.with_env_overrides();
    config.validate()?;
    Ok(format!(
        "✓ Configuration is valid: {}\n{}",
        args.config.display(),
        summary(&config)
    ))
}

fn summary(config: &LifelineConfig) -> String {
    let source = match config.monitor.mode {
        Mode::Simulated => format!(
            "simulated {} every {}ms",
            config.simulation.kind.label(),
            config.simulation.interval_ms
        ),
        Mode::Streaming => format!("device feed {}", config.stream.endpoint),
    };
    let start = if config.monitor.autostart {
        "at startup"
    } else {
        "from the dashboard"
    };
    let dashboard = if config.server.dashboard {
        format!("http://{}", config.server.bind_addr())
    } else {
        "off (API only)".to_string()
    };

    [
        format!("  Source:      {} (started {})", source, start),
        format!("  Window:      {} samples", config.window.capacity),
        format!("  Prediction:  {}", config.prediction.endpoint),
        format!("  Dashboard:   {}", dashboard),
    ]
    .join("\n")
}
