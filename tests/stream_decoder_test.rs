//! Integration tests for the streaming decode path
//!
//! Exercises the decoder and the fragment stream through the public API,
//! with the wire split at arbitrary byte boundaries.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use quickcheck_macros::quickcheck;
use sketchbuddy::streaming::{fragment_stream, StreamDecoder};
use sketchbuddy::Result;

const WIRE: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\ndata: [DONE]\n";

// Multi-byte content and no trailing newline, so cuts land inside
// characters and the last record only surfaces on finish
const WIDE_WIRE: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"café \"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"中文绘画\"}}]}";

fn decode_in_pieces(wire: &[u8], cuts: &[usize]) -> Vec<String> {
    let mut decoder = StreamDecoder::new();
    let mut fragments = Vec::new();

    let mut start = 0;
    for &cut in cuts {
        fragments.extend(decoder.feed(&wire[start..cut]));
        start = cut;
    }
    fragments.extend(decoder.feed(&wire[start..]));
    fragments.extend(decoder.finish());

    fragments
}

fn transport(chunks: Vec<&'static str>) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    let owned: Vec<Result<Bytes>> = chunks
        .into_iter()
        .map(|c| Ok(Bytes::from_static(c.as_bytes())))
        .collect();
    tokio_stream::iter(owned)
}

async fn collect_ok(stream: impl Stream<Item = Result<String>>) -> Vec<String> {
    tokio::pin!(stream);
    let mut fragments = Vec::new();
    while let Some(item) = stream.next().await {
        fragments.push(item.expect("stream should not fail"));
    }
    fragments
}

// Decoder over the full wire

#[test]
fn test_wire_vector_decodes_in_order() {
    assert_eq!(decode_in_pieces(WIRE.as_bytes(), &[]), vec!["Hi", " there"]);
}

#[test]
fn test_wire_vector_byte_by_byte() {
    let cuts: Vec<usize> = (1..WIRE.len()).collect();
    assert_eq!(decode_in_pieces(WIRE.as_bytes(), &cuts), vec!["Hi", " there"]);
}

#[quickcheck]
fn chunk_cuts_never_change_output(cuts: Vec<usize>) -> bool {
    let bytes = WIRE.as_bytes();
    let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c % (bytes.len() + 1)).collect();
    cuts.sort_unstable();

    decode_in_pieces(bytes, &cuts) == vec!["Hi".to_string(), " there".to_string()]
}

#[quickcheck]
fn chunk_cuts_never_corrupt_multibyte_text(cuts: Vec<usize>) -> bool {
    let bytes = WIDE_WIRE.as_bytes();
    let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c % (bytes.len() + 1)).collect();
    cuts.sort_unstable();

    decode_in_pieces(bytes, &cuts) == vec!["café ".to_string(), "中文绘画".to_string()]
}

#[test]
fn test_malformed_record_skipped_between_good_records() {
    let wire = "data: {\"choices\":[{\"delta\":{\"content\":\"one\"}}]}\n\
                data: {broken\n\
                data: {\"choices\":[{\"delta\":{\"content\":\"two\"}}]}\n";

    assert_eq!(decode_in_pieces(wire.as_bytes(), &[]), vec!["one", "two"]);
}

#[test]
fn test_done_before_any_record_yields_nothing() {
    let wire = "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n";

    assert!(decode_in_pieces(wire.as_bytes(), &[]).is_empty());
}

// Fragment stream over a chunked transport

#[tokio::test]
async fn test_wire_vector_through_fragment_stream() {
    let chunks = transport(vec![
        "data: {\"choices\":[{\"delta\":{\"con",
        "tent\":\"Hi\"}}]}\n\ndata: {\"choices\":[{\"delta\"",
        ":{\"content\":\" there\"}}]}\n\ndata: [DONE]\n",
    ]);

    let fragments = collect_ok(fragment_stream(chunks)).await;
    assert_eq!(fragments, vec!["Hi", " there"]);
}

#[tokio::test]
async fn test_stream_ends_at_done_even_when_transport_continues() {
    let chunks = transport(vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
        "data: [DONE]\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n",
    ]);

    let fragments = collect_ok(fragment_stream(chunks)).await;
    assert_eq!(fragments, vec!["Hi"]);
}

#[tokio::test]
async fn test_trailing_record_flushed_when_transport_ends() {
    let chunks = transport(vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}",
    ]);

    let fragments = collect_ok(fragment_stream(chunks)).await;
    assert_eq!(fragments, vec!["partial"]);
}

#[tokio::test]
async fn test_multibyte_character_split_across_chunks() {
    let record = "data: {\"choices\":[{\"delta\":{\"content\":\"café\"}}]}\n";
    let cut = record.find('é').expect("record contains é") + 1;

    let bytes = record.as_bytes();
    let first = Bytes::copy_from_slice(&bytes[..cut]);
    let second = Bytes::copy_from_slice(&bytes[cut..]);
    let chunks = tokio_stream::iter(vec![Ok(first), Ok(second)]);

    let fragments = collect_ok(fragment_stream(chunks)).await;
    assert_eq!(fragments, vec!["café"]);
}
