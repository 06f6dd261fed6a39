//! Serving the router with a bounded graceful shutdown.

use axum::Router;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves `app` until `shutdown` resolves.
///
/// Once `shutdown` resolves the listener stops accepting and in-flight requests get `grace`
/// to finish; connections still open after that are dropped.
///
/// # Errors
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let graceful = async move {
        shutdown.await;
        tracing::info!(grace_secs = grace.as_secs(), "shutdown requested, draining requests");
        let _ = signalled_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();
    tokio::pin!(server);

    let deadline = async move {
        if signalled_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut server => result?,
        () = deadline => {
            tracing::warn!("grace period elapsed, closing remaining connections");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_stuck_request_does_not_block_shutdown() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have address");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = stop_rx.await;
            },
            Duration::from_millis(100),
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.expect("should connect");
        tokio::io::AsyncWriteExt::write_all(
            &mut stream,
            b"GET /slow HTTP/1.1\r\nhost: localhost\r\n\r\n",
        )
        .await
        .expect("should send request");
        tokio::time::sleep(Duration::from_millis(50)).await;

        stop_tx.send(()).expect("server should be listening for shutdown");
        let finished = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("serve should return after the grace period")
            .expect("task should not panic");
        assert!(finished.is_ok());
    }
}
