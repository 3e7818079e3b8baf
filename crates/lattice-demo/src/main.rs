//! `lattice`: a window showing a 10×10×10 grid of lit, animated meshes.
//!
//! Usage: `lattice [sphere|cube]` (default: sphere).

mod app;

use anyhow::{Context, Result, bail};
use lattice_engine::device::GpuInit;
use lattice_engine::logging::{LoggingConfig, init_logging};
use lattice_engine::render::{EngineConfig, MeshKind};
use lattice_engine::window::{Runtime, RuntimeConfig};

use crate::app::LatticeApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mesh = parse_mesh_arg(std::env::args().skip(1))?;
    log::info!("starting lattice with {mesh} mesh");

    let config = EngineConfig {
        mesh,
        ..EngineConfig::default()
    };

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), LatticeApp::new(config))
        .context("lattice runtime error")
}

/// Reads the optional mesh name. More than one argument is an error.
fn parse_mesh_arg<I>(mut args: I) -> Result<MeshKind>
where
    I: Iterator<Item = String>,
{
    let Some(name) = args.next() else {
        return Ok(MeshKind::default());
    };

    if let Some(extra) = args.next() {
        bail!("unexpected argument {extra:?}; usage: lattice [sphere|cube]");
    }

    name.parse()
}
