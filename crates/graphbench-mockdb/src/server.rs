//! Connection loop of the mock server.

use std::sync::Arc;

use anyhow::{Context, Result};
use graphbench_backend::protocol::{decode_frame, encode_frame, Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::database::MockDatabase;

/// Accept connections forever, serving each on its own task.
pub async fn serve(listener: TcpListener, database: MockDatabase) -> Result<()> {
    let database = Arc::new(Mutex::new(database));
    info!(
        "Mock server listening on {}",
        listener.local_addr().context("listener has no address")?
    );

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        debug!("Client connected from {}", peer);
        let database = database.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, database).await {
                warn!("Connection from {} ended with error: {:#}", peer, e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, database: Arc<Mutex<MockDatabase>>) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut closed = false;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match decode_frame::<Request>(&line) {
            Ok(Request::Close) => {
                closed = true;
                match database.lock().await.persist() {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::error(e.to_string()),
                }
            }
            Ok(request) => database.lock().await.handle(request),
            Err(e) => Response::error(e.to_string()),
        };

        write_half
            .write_all(encode_frame(&response)?.as_bytes())
            .await?;
        if closed {
            break;
        }
    }

    if !closed {
        database.lock().await.persist()?;
    }
    Ok(())
}
