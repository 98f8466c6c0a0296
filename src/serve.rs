//! Local preview server.
//!
//! Serves the built output directory over HTTP for checking a site before
//! publishing. Static files only: `ServeDir` resolves directory requests to
//! their `index.html`, so `/` shows the post index and post permalinks work
//! as they will on a real file server. No hot reload — re-run `build` and
//! refresh.

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tower_http::services::ServeDir;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Output directory does not exist: {0} (run `build` first)")]
    MissingOutput(String),
}

/// Serve `dir` on `127.0.0.1:port` until interrupted.
pub fn serve(dir: &Path, port: u16) -> Result<(), ServeError> {
    if !dir.is_dir() {
        return Err(ServeError::MissingOutput(dir.display().to_string()));
    }

    let app = Router::new().fallback_service(ServeDir::new(dir));
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        println!(
            "Serving {} at http://localhost:{port}",
            dir.display()
        );
        println!("Press Ctrl+C to stop");
        axum::serve(listener, app).await
    })?;

    Ok(())
}
