//! Pull-based fragment stream
//!
//! Bridges a byte transport to an ordered stream of text fragments:
//! - Decoding runs in a background task feeding a bounded channel
//! - Dropping the consumer stops the task and releases the transport
//! - A mid-stream failure surfaces after the fragments decoded before it

use crate::errors::Result;
use crate::streaming::decoder::StreamDecoder;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::debug;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Fragments buffered between the decode task and the consumer
const FRAGMENT_CHANNEL_CAPACITY: usize = 64;

/// Wrap a byte transport in an ordered fragment stream.
///
/// The transport is read to completion, through the termination literal,
/// or until the consumer is dropped, whichever comes first. On every one
/// of those paths the transport itself is dropped, closing the connection.
pub fn fragment_stream<S>(transport: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        tokio::pin!(transport);
        let mut decoder = StreamDecoder::new();

        loop {
            // Waiting on the transport alone would hold the connection
            // open for as long as it stays silent after the consumer
            // leaves, so race the read against the channel closing
            let delivery = tokio::select! {
                biased;
                _ = tx.closed() => {
                    debug!("fragment consumer gone, dropping transport");
                    return;
                }
                delivery = transport.next() => delivery,
            };

            match delivery {
                Some(Ok(chunk)) => {
                    for fragment in decoder.feed(&chunk) {
                        if tx.send(Ok(fragment)).await.is_err() {
                            debug!("fragment consumer gone, dropping transport");
                            return;
                        }
                    }
                    if decoder.is_finished() {
                        break;
                    }
                }
                Some(Err(err)) => {
                    // Fragments already delivered stay delivered; only
                    // the failure itself is surfaced
                    let _ = tx.send(Err(err)).await;
                    return;
                }
                None => break,
            }
        }

        for fragment in decoder.finish() {
            if tx.send(Ok(fragment)).await.is_err() {
                return;
            }
        }
    });

    ReceiverStream::new(rx)
}
