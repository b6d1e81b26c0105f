//! Test fixtures: throwaway databases and a scripted local HTTP responder.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use checkup::pool::open_local_pool;
use checkup::{LibsqlStore, initialize_database};
use tempfile::{TempDir, tempdir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Migrated store in a temporary directory; keep the TempDir alive
pub async fn create_test_store() -> anyhow::Result<(Arc<LibsqlStore>, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("checkup.db");
    let pool = open_local_pool(&db_path.to_string_lossy(), 8).await?;
    initialize_database(&pool).await?;
    Ok((Arc::new(LibsqlStore::new_from_pool(pool)), temp_dir))
}

/// How the responder treats every connection
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Answer with `status` after `delay`
    Respond { status: u16, delay: Duration },
    /// Accept and never answer
    Hang,
}

/// Serve `behaviour` on an ephemeral local port; returns the base URL
pub async fn spawn_responder(behaviour: Behaviour) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind responder");
    let addr: SocketAddr = listener.local_addr().expect("responder addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if read == buf.len() {
                        break;
                    }
                }

                match behaviour {
                    Behaviour::Respond { status, delay } => {
                        tokio::time::sleep(delay).await;
                        let response = format!(
                            "HTTP/1.1 {status} Scripted\r\n\
                             content-length: 0\r\nconnection: close\r\n\r\n"
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Behaviour::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });

    format!("http://{addr}/")
}
