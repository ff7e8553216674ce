//! IMA Site - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = ima_site::run().await {
        tracing::error!(error = %e, "server stopped");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
