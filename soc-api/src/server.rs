//! Listener setup and the serve loop.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};

/// Bind the primary address, falling back to the fallback port once.
pub async fn bind_listener(config: &ServerConfig) -> ApiResult<(TcpListener, SocketAddr)> {
    let addr = config.addr()?;
    let primary_err = match TcpListener::bind(addr).await {
        Ok(listener) => return bound(listener),
        Err(err) => err,
    };

    let Some(fallback) = config.fallback_addr()? else {
        return Err(ApiError::internal_error(format!(
            "Failed to bind {}: {}",
            addr, primary_err
        )));
    };

    tracing::warn!(%addr, %fallback, error = %primary_err, "Bind failed, trying fallback port");
    let listener = TcpListener::bind(fallback)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", fallback, e)))?;
    bound(listener)
}

fn bound(listener: TcpListener) -> ApiResult<(TcpListener, SocketAddr)> {
    let local = listener
        .local_addr()
        .map_err(|e| ApiError::internal_error(format!("Listener has no address: {}", e)))?;
    Ok((listener, local))
}

/// Serve `app` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> ApiResult<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "Failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn local_config(port: u16, fallback_port: Option<u16>) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            fallback_port,
            static_dir: PathBuf::from("static"),
        }
    }

    #[tokio::test]
    async fn test_binds_primary_port() -> ApiResult<()> {
        let (_listener, addr) = bind_listener(&local_config(0, None)).await?;
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_taken() -> ApiResult<()> {
        let (_taken, taken_addr) = bind_listener(&local_config(0, None)).await?;

        let (_listener, addr) =
            bind_listener(&local_config(taken_addr.port(), Some(0))).await?;
        assert_ne!(addr.port(), taken_addr.port());
        Ok(())
    }

    #[tokio::test]
    async fn test_fails_without_fallback() -> ApiResult<()> {
        let (_taken, taken_addr) = bind_listener(&local_config(0, None)).await?;

        let err = bind_listener(&local_config(taken_addr.port(), None))
            .await
            .expect_err("port is taken");
        assert!(err.message.contains("Failed to bind"));
        Ok(())
    }
}
