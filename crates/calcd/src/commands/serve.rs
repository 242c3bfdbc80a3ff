use calc_core::CalcConfig;
use calc_trigger::{HttpTrigger, RequestHandler};
use tokio::sync::watch;
use tracing::info;

pub fn serve(config: CalcConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: CalcConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let trigger = HttpTrigger::new(addr, RequestHandler::from_config(&config))
        .with_max_body_bytes(config.max_body_bytes());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(trigger.serve(shutdown_rx));

    // The server only stops on its own when it fails, e.g. on bind.
    let stopped = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            false
        }
        result = &mut server => {
            result??;
            true
        }
    };

    if !stopped {
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
        server.await??;
    }

    info!("calcd stopped");
    Ok(())
}
