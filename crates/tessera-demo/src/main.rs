mod sim;

use std::path::PathBuf;

use anyhow::Result;
use tessera_engine::device::GpuInit;
use tessera_engine::frame::{HostConfig, TileHost};
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::render::{AtlasConfig, ClearColor};
use tessera_engine::window::{Runtime, RuntimeConfig};

use crate::sim::FallingBlocks;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // Optional first argument overrides the atlas path.
    let atlas = match std::env::args_os().nth(1) {
        Some(path) => AtlasConfig {
            path: PathBuf::from(path),
            ..AtlasConfig::default()
        },
        None => AtlasConfig::default(),
    };

    let host = TileHost::new(
        FallingBlocks::new(),
        HostConfig {
            atlas,
            clear: ClearColor::BLACK,
        },
    );

    Runtime::run(
        RuntimeConfig {
            title: "tessera demo".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        host,
    )
}
