//! The two HTTP surfaces: the Data API and the Supervisor API (§6.4)

pub mod data;
pub mod error;
pub mod supervisor;

use anyhow::Result;
use std::net::SocketAddr;

/// Bind and serve `router` on `port`, logging the bound address first.
pub async fn serve(router: axum::Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
