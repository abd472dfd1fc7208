//! Client Connections
//!
//! One task per accepted socket: accumulate bytes, parse RESP frames,
//! flatten each frame into a command line, run it to completion on the
//! engine, write the reply back. A connection never has more than one
//! command in flight, which is what gives commands from a single
//! client their arrival-order guarantee.

use crate::protocol::{ParseError, RespParser, RespValue};
use crate::storage::EngineHandle;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Hard cap on buffered, unparsed request bytes per connection.
const MAX_BUFFER_SIZE: usize = 64 * 1024;

const INITIAL_BUFFER_SIZE: usize = 4096;

/// Per-connection state visible to command handlers. SELECT changes
/// the database index; everything else only reads it.
#[derive(Debug)]
pub struct Client {
    addr: SocketAddr,
    db_index: AtomicUsize,
}

impl Client {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            db_index: AtomicUsize::new(0),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The database this connection currently targets.
    pub fn db_index(&self) -> usize {
        self.db_index.load(Ordering::Relaxed)
    }

    pub fn set_db_index(&self, index: usize) {
        self.db_index.store(index, Ordering::Relaxed);
    }
}

/// Errors ending a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("client disconnected")]
    Disconnected,

    #[error("connection closed mid-frame")]
    UnexpectedEof,

    #[error("request buffer limit exceeded")]
    BufferFull,
}

/// Drives one client connection to completion.
pub struct ConnectionHandler {
    stream: BufWriter<TcpStream>,
    client: Arc<Client>,
    buffer: BytesMut,
    parser: RespParser,
    engine: EngineHandle,
}

impl ConnectionHandler {
    pub fn new(stream: TcpStream, addr: SocketAddr, engine: EngineHandle) -> Self {
        Self {
            stream: BufWriter::new(stream),
            client: Arc::new(Client::new(addr)),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            parser: RespParser::new(),
            engine,
        }
    }

    /// The read-execute-reply loop, until disconnect or error.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.client.addr(), "client connected");
        let result = self.main_loop().await;
        match &result {
            Ok(()) | Err(ConnectionError::Disconnected) => {
                debug!(client = %self.client.addr(), "client disconnected");
            }
            Err(err) => {
                warn!(client = %self.client.addr(), error = %err, "connection error");
            }
        }
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(frame) = self.try_parse_frame()? {
                let reply = match frame.into_cmd_line() {
                    Some(line) if line.is_empty() => continue,
                    Some(line) => self.engine.exec(Arc::clone(&self.client), line).await,
                    None => RespValue::error("ERR invalid request"),
                };
                self.send_reply(&reply).await?;
            }
            self.read_more().await?;
        }
    }

    fn try_parse_frame(&mut self) -> Result<Option<RespValue>, ConnectionError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        match self.parser.parse(&self.buffer)? {
            Some((frame, consumed)) => {
                let _ = self.buffer.split_to(consumed);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    async fn read_more(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            return Err(ConnectionError::BufferFull);
        }
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::Disconnected)
            } else {
                Err(ConnectionError::UnexpectedEof)
            };
        }
        Ok(())
    }

    async fn send_reply(&mut self, reply: &RespValue) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Runs a connection to completion, swallowing the ordinary ways a
/// client goes away.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, engine: EngineHandle) {
    let handler = ConnectionHandler::new(stream, addr, engine);
    if let Err(err) = handler.run().await {
        match err {
            ConnectionError::Disconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => debug!(client = %addr, error = %err, "connection ended with error"),
        }
    }
}
