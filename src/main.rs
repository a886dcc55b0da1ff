use anyhow::Result;
use tokio::task::LocalSet;

mod app;
mod bridge;
mod config;
mod export;
mod host;
mod popup;
mod registry;
mod scene_graph;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::ExportConfig::from_args(std::env::args().skip(1))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    LocalSet::new().block_on(&runtime, app::run(config))
}
