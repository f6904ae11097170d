use anyhow::Result;
use roost_browser::{CdpDriver, PostSession};
use roost_core::Config;
use roost_server::AppState;
use std::net::SocketAddr;

pub fn execute(port: u16) -> Result<()> {
    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        // Step 1: Load credentials, failing fast on anything missing
        let config = Config::from_env()?;

        // Step 2: Connect to the remote browser
        println!("🔗 Connecting to remote browser...");
        let driver = CdpDriver::connect(&config.connect_url()?).await?;
        println!("✅ Browser session established");

        // Step 3: Restore any persisted login
        let mut session = PostSession::new(driver, &config);
        session.init().await?;

        // Step 4: Run the HTTP service until ctrl-c
        let upload_dir = std::env::temp_dir().join("roost-uploads");
        let state = AppState::new(Box::new(session), upload_dir)?;

        let addr: SocketAddr = ([127, 0, 0, 1], port).into();
        println!("🌐 Listening on http://{}", addr);
        println!("Press Ctrl+C to stop...");

        roost_server::serve(addr, state).await?;

        println!("✅ Server stopped gracefully");
        Ok(())
    });

    // Explicitly shutdown runtime with timeout to prevent hanging on blocking tasks
    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
