use anyhow::Context;
use env_logger::{Builder, Env};
use log::info;

use showroom::{ShowroomApp, WalkthroughConfig};

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => WalkthroughConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.to_string_lossy()))?,
        None => WalkthroughConfig::default(),
    };
    info!(
        "Starting '{}' with {} cars",
        config.window.title,
        config.assets.cars.len()
    );

    ShowroomApp::new(config)?.run()
}
