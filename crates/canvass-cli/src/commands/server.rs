//! `canvass server` — Start the Canvass HTTP backend server.

pub async fn run(host: String, port: u16, db_path: String) -> Result<(), String> {
    let config = canvass_server::ServerConfig {
        host: host.clone(),
        port,
        db_path,
    };

    println!("Starting Canvass server on {}:{}...", host, port);

    let addr = canvass_server::start_server(config).await?;
    println!("Canvass server listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
