//! Client sessions against a running database server.
//!
//! The drivers and the benchmark runner only see the [`Connector`] and
//! [`Session`] traits; [`TcpConnector`] is the default transport speaking the
//! line-delimited JSON frames from [`crate::protocol`].

use async_trait::async_trait;
use graphbench_core::SampledSubgraph;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::BackendError;
use crate::protocol::{decode_frame, encode_frame, Request, Response};

/// Opens client sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the server on `host:port`.
    async fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Session>, BackendError>;
}

/// One client connection.
#[async_trait]
pub trait Session: Send {
    /// Create a tensor store holding vectors of width `dim`.
    async fn create_tensor_store(&mut self, name: &str, dim: usize) -> Result<(), BackendError>;

    /// Store `values` under `key`.
    async fn put_tensor(
        &mut self,
        store: &str,
        key: &str,
        values: &[f32],
    ) -> Result<(), BackendError>;

    /// Fetch the vectors stored under `keys`, in order.
    async fn get_tensors(
        &mut self,
        store: &str,
        keys: &[String],
    ) -> Result<Vec<Vec<f32>>, BackendError>;

    /// Draw a random subgraph: `num_seeds` seeds expanded by `fan_out`.
    async fn subgraph(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError>;

    /// End the session.
    async fn close(&mut self) -> Result<(), BackendError>;
}

/// Default connector using TCP and JSON-lines frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<Box<dyn Session>, BackendError> {
        let session = TcpSession::connect(host, port).await?;
        Ok(Box::new(session))
    }
}

/// Session over a TCP stream.
pub struct TcpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    closed: bool,
}

impl TcpSession {
    pub async fn connect(host: &str, port: u16) -> Result<Self, BackendError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| BackendError::connection(format!("{host}:{port}: {e}")))?;
        stream
            .set_nodelay(true)
            .map_err(|e| BackendError::connection(e.to_string()))?;
        debug!("Connected to {}:{}", host, port);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            closed: false,
        })
    }

    /// Send one request and read one response.
    async fn call(&mut self, request: &Request) -> Result<Response, BackendError> {
        if self.closed {
            return Err(BackendError::connection("session already closed"));
        }

        let frame = encode_frame(request)?;
        trace!("-> {}", frame.trim_end());
        self.writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;
        if read == 0 {
            self.closed = true;
            return Err(BackendError::connection("server closed the connection"));
        }
        trace!("<- {}", line.trim_end());

        match decode_frame(&line)? {
            Response::Error { message } => Err(BackendError::Client(message)),
            response => Ok(response),
        }
    }

    async fn call_ok(&mut self, request: &Request) -> Result<(), BackendError> {
        match self.call(request).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(request, &other)),
        }
    }
}

fn unexpected(request: &Request, response: &Response) -> BackendError {
    BackendError::protocol(format!("unexpected response {:?} to {:?}", response, request))
}

#[async_trait]
impl Session for TcpSession {
    async fn create_tensor_store(&mut self, name: &str, dim: usize) -> Result<(), BackendError> {
        self.call_ok(&Request::CreateTensorStore {
            name: name.to_string(),
            dim,
        })
        .await
    }

    async fn put_tensor(
        &mut self,
        store: &str,
        key: &str,
        values: &[f32],
    ) -> Result<(), BackendError> {
        self.call_ok(&Request::PutTensor {
            store: store.to_string(),
            key: key.to_string(),
            values: values.to_vec(),
        })
        .await
    }

    async fn get_tensors(
        &mut self,
        store: &str,
        keys: &[String],
    ) -> Result<Vec<Vec<f32>>, BackendError> {
        let request = Request::GetTensors {
            store: store.to_string(),
            keys: keys.to_vec(),
        };
        match self.call(&request).await? {
            Response::Tensors { values } if values.len() == keys.len() => Ok(values),
            other => Err(unexpected(&request, &other)),
        }
    }

    async fn subgraph(
        &mut self,
        num_seeds: usize,
        fan_out: &[usize],
    ) -> Result<SampledSubgraph, BackendError> {
        let request = Request::Subgraph {
            num_seeds,
            fan_out: fan_out.to_vec(),
        };
        match self.call(&request).await? {
            Response::Subgraph { subgraph } => Ok(subgraph),
            other => Err(unexpected(&request, &other)),
        }
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if self.closed {
            return Ok(());
        }
        let result = self.call_ok(&Request::Close).await;
        self.closed = true;
        // Best effort, the server may already have hung up
        let _ = self.writer.shutdown().await;
        result
    }
}
