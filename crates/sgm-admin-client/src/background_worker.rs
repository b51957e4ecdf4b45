use anyhow::Context as _;

pub fn create_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to create runtime")
}

/// Keeps the runtime alive on its own thread so requests can be spawned on it
/// from the UI thread
pub fn start_background_worker(rt: tokio::runtime::Runtime) {
    std::thread::spawn(move || {
        tracing::info!("Background worker started");
        rt.block_on(async {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
        })
    });
}
