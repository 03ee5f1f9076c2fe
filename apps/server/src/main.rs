use anyhow::Context;
use svcd_kernel::prelude::{ApiConfig, load_config};
use svcd_server::{Server, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "server".to_owned());
    let cfg: ApiConfig =
        load_config(Some(&path)).context("Critical: Configuration is malformed")?;

    let _log = logger(&cfg.log).init()?;

    Server::builder().config(cfg).build().await?.run().await
}
