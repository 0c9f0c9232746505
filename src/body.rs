//! Request body accumulation for POST and PUT.
//!
//! Frames are appended to one buffer in arrival order until the stream ends.
//! The buffer lives only inside [`accumulate`]. On any error it is dropped
//! with the future and the handler never runs.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use http_body::Body;
use http_body_util::BodyExt;

use crate::config::Limits;
use crate::error::{BoxError, Error};

/// Buffers the whole body, enforcing the size limit and the idle timeout.
pub(crate) async fn accumulate<B>(body: B, limits: Limits) -> Result<Bytes, Error>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = limits.max_body_bytes;
    let mut body = std::pin::pin!(body);

    // A declared content-length over the limit is rejected before reading.
    if body.size_hint().lower() > limit as u64 {
        return Err(Error::BodyTooLarge { limit });
    }

    let mut buf = BytesMut::new();
    loop {
        let next = match limits.read_timeout {
            Some(idle) => tokio::time::timeout(idle, body.frame())
                .await
                .map_err(|_| Error::BodyTimeout)?,
            None => body.frame().await,
        };
        let Some(frame) = next else { break };
        let frame = frame.map_err(|e| Error::BodyAborted(e.into()))?;

        // trailers carry no payload
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.remaining() > limit {
                return Err(Error::BodyTooLarge { limit });
            }
            buf.put(data);
        }
    }

    Ok(buf.freeze())
}
