//! Newline-delimited JSON front end for [`explore`].
//!
//! Every input line is one [`Request`]; every output line is one [`Response`].
//! Requests are computed off the async executor. A request that is still computing
//! when the next line arrives is aborted and never answered, so a client dragging a
//! slider only receives the reports it can still use.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task::{self, JoinError, JoinHandle},
};
use tokio_util::{
    bytes::BytesMut,
    codec::{Decoder, FramedRead, FramedWrite, LinesCodec, LinesCodecError},
    sync::CancellationToken,
};

use crate::{
    config::ExplorerConfig,
    session::{explore, Report, Request},
    GdError, Result,
};

/// Longest request line accepted, in bytes.
pub const MAX_REQUEST_LEN: usize = 64 * 1024;

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Report(Report),
    Rejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        error: String,
    },
}

impl Response {
    fn oversized() -> Self {
        Self::Rejected {
            id: None,
            error: format!("request line longer than {MAX_REQUEST_LEN} bytes"),
        }
    }
}

/// One framed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Line(String),
    /// A line over [`MAX_REQUEST_LEN`] bytes. Its bytes are skipped up to the next
    /// newline.
    Oversized,
}

type Decoded<T> = std::result::Result<Option<T>, LinesCodecError>;

/// [`LinesCodec`] with a length limit that reports oversized lines as a frame.
///
/// A decoder error ends a `FramedRead` stream, so an oversized line must not
/// surface as one.
#[derive(Debug, Clone)]
pub struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_REQUEST_LEN),
        }
    }

    fn frame(decoded: Decoded<String>) -> Decoded<Frame> {
        match decoded {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(e) => Err(e),
        }
    }
}

impl Default for RequestCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RequestCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Decoded<Frame> {
        Self::frame(self.lines.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Decoded<Frame> {
        Self::frame(self.lines.decode_eof(buf))
    }
}

/// Decodes and answers a single request line.
///
/// Never fails: malformed or invalid requests become [`Response::Rejected`].
pub fn respond(line: &str, config: &ExplorerConfig) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            let err = GdError::from(e);
            warn!("rejected request line: {err}");
            return Response::Rejected {
                id: None,
                error: err.to_string(),
            };
        }
    };

    match explore(&request, config) {
        Ok(report) => Response::Report(report),
        Err(e) => {
            warn!("rejected request {:?}: {e}", request.id);
            Response::Rejected {
                id: request.id,
                error: e.to_string(),
            }
        }
    }
}

/// Serves requests read from `reader`, writing responses to `writer`.
///
/// Returns when the input ends, after answering the request still in flight, or as
/// soon as `shutdown` is cancelled, dropping it.
///
/// A request that cannot be decoded or computed, including one whose computation
/// panics, is answered with [`Response::Rejected`] and the loop goes on.
///
/// # Errors
/// Returns `GdError::Io` if reading or writing fails.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    config: Arc<ExplorerConfig>,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut requests = FramedRead::new(reader, RequestCodec::new());
    let mut responses = FramedWrite::new(writer, LinesCodec::new());
    let mut in_flight: Option<JoinHandle<Response>> = None;

    info!("serving requests");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested");
                if let Some(task) = in_flight.take() {
                    task.abort();
                }
                return Ok(());
            }
            done = finished(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                if let Some(response) = completed(done) {
                    send(&mut responses, &response).await?;
                }
            }
            frame = requests.next() => match frame {
                Some(Ok(Frame::Line(line))) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let config = Arc::clone(&config);
                    let task = task::spawn_blocking(move || respond(&line, &config));
                    if let Some(stale) = in_flight.replace(task) {
                        debug!("superseding request still in flight");
                        stale.abort();
                    }
                }
                Some(Ok(Frame::Oversized)) => {
                    warn!("request line longer than {MAX_REQUEST_LEN} bytes");
                    send(&mut responses, &Response::oversized()).await?;
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    if let Some(task) = in_flight.take() {
        if let Some(response) = completed(Some(task.await)) {
            send(&mut responses, &response).await?;
        }
    }
    info!("input closed");

    Ok(())
}

type Joined = std::result::Result<Response, JoinError>;

async fn finished(task: &mut Option<JoinHandle<Response>>) -> Option<Joined> {
    match task {
        Some(handle) => Some(handle.await),
        None => None,
    }
}

fn completed(done: Option<Joined>) -> Option<Response> {
    match done {
        Some(Ok(response)) => Some(response),
        Some(Err(e)) if e.is_cancelled() => None,
        Some(Err(e)) => {
            error!("request computation failed: {e}");
            Some(Response::Rejected {
                id: None,
                error: "internal error: request computation failed".to_string(),
            })
        }
        None => None,
    }
}

async fn send<W>(responses: &mut FramedWrite<W, LinesCodec>, response: &Response) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = serde_json::to_string(response)?;
    responses.send(line).await?;
    Ok(())
}
