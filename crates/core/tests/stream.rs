//! Tests for the streaming decoder and merger.

use futures_util::{StreamExt, stream};
use ullm_core::{
    Decoder, Error, FinishReason, Merger, Result, StreamableResponse, collect, partials,
    testing::{Reply, Scripted},
};

fn units(units: &[&str]) -> impl futures_core::Stream<Item = Result<String>> + Send + use<> {
    let units: Vec<_> = units.iter().map(|u| Ok(u.to_string())).collect();
    stream::iter(units)
}

#[test]
fn decoder_buffers_until_complete() {
    let adapter = Scripted::<()>::new();
    let mut decoder = Decoder::new();

    assert!(decoder.feed(&adapter, r#"{"content":"Hel"#).unwrap().is_none());
    assert_eq!(decoder.buffer(), r#"{"content":"Hel"#);

    let partial = decoder.feed(&adapter, r#"lo"}"#).unwrap().unwrap();
    assert_eq!(partial.content, "Hello");
    assert_eq!(decoder.buffer(), "");
    decoder.finish().unwrap();
}

#[tokio::test]
async fn split_frames_decode_once() {
    let decoded: Vec<Reply> = partials(
        units(&[r#"{"content":"#, r#""Hi"}"#, r#"{"content":" there"}"#]),
        Scripted::<()>::new(),
    )
    .map(|p| p.unwrap())
    .collect()
    .await;

    let contents: Vec<_> = decoded.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, ["Hi", " there"]);
}

#[tokio::test]
async fn merged_stream_equals_concatenation() {
    let frames = [
        r#"{"content":"The weather "}"#,
        r#"{"content":"is "}"#,
        r#"{"content":"sunny.","finish_reason":"stop"}"#,
    ];
    let merged: Reply = collect(partials(units(&frames), Scripted::<()>::new()))
        .await
        .unwrap();

    assert_eq!(merged, Reply::text("The weather is sunny."));
    assert_eq!(merged.finish_reason, Some(FinishReason::Stop));
}

#[test]
fn tool_call_fragments_merge_by_index() {
    let adapter = Scripted::<()>::new();
    let mut decoder = Decoder::new();
    let mut merger = Merger::<Reply>::new();
    for unit in [
        r#"{"tool_calls":[{"index":0,"id":"call_1","name":"get_weather","arguments":"{\"loc"}]}"#,
        r#"{"tool_calls":[{"index":1,"id":"call_2","name":"get_time","arguments":""}]}"#,
        r#"{"tool_calls":[{"index":0,"arguments":"ation\":\"Boston\"}"}]}"#,
        r#"{"finish_reason":"tool_calls"}"#,
    ] {
        if let Some(partial) = decoder.feed(&adapter, unit).unwrap() {
            merger.push(partial);
        }
    }
    decoder.finish().unwrap();

    let merged = merger.finish();
    assert_eq!(merged.tool_calls.len(), 2);
    assert_eq!(merged.tool_calls[0].id, "call_1");
    assert_eq!(merged.tool_calls[0].name, "get_weather");
    assert_eq!(merged.tool_calls[0].arguments, r#"{"location":"Boston"}"#);
    assert_eq!(merged.tool_calls[1].name, "get_time");
    assert_eq!(merged.finish_reason, Some(FinishReason::ToolCalls));
}

#[test]
fn combine_is_associative_over_partials() {
    let a = Reply::text("a");
    let b = Reply::text("b");
    let c = Reply::text("c");

    let mut left = Reply::default();
    left.combine(&a);
    left.combine(&b);
    left.combine(&c);

    let mut bc = b.clone();
    bc.combine(&c);
    let mut right = Reply::default();
    right.combine(&a);
    right.combine(&bc);

    assert_eq!(left, right);
}

#[tokio::test]
async fn trailing_garbage_fails_the_stream() {
    let results: Vec<_> = partials(
        units(&[r#"{"content":"ok"}"#, r#"{"content":"#]),
        Scripted::<()>::new(),
    )
    .collect()
    .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().content, "ok");
    match &results[1] {
        Err(Error::StreamDecodeFailed { buffer, .. }) => assert_eq!(buffer, r#"{"content":"#),
        other => panic!("expected StreamDecodeFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn vendor_error_frame_fails_the_stream() {
    let results: Vec<_> = partials(
        units(&[
            r#"{"content":"partial"}"#,
            r#"{"error":{"message":"overloaded","type":"server_error"}}"#,
            r#"{"content":"never"}"#,
        ]),
        Scripted::<()>::new(),
    )
    .collect()
    .await;

    assert_eq!(results.len(), 2);
    match &results[1] {
        Err(Error::Vendor(error)) => {
            assert_eq!(error.message, "overloaded");
            assert_eq!(error.kind.as_deref(), Some("server_error"));
        }
        other => panic!("expected a vendor error, got {other:?}"),
    }
}

#[test]
fn clean_end_after_success() {
    let adapter = Scripted::<()>::new();
    let mut decoder = Decoder::new();
    decoder.feed(&adapter, r#"{"content":"x"}"#).unwrap();
    assert!(decoder.finish().is_ok());
}
