use std::rc::Rc;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use codee::{Decoder, Encoder};
use futures::executor::LocalPool;
use sitelet::{AppState, LoopbackTransport, RemoteRegistry, ServerSettings, router};
use sitelet_client::reactive::{AsyncResult, Session};
use sitelet_client::{Remote, RemoteError, Reverser};
use sitelet_common::codec::SiteletBincodeCodec;
use sitelet_common::{NetworkPacket, RemoteFault, ReverseString, Reversed};
use tower::ServiceExt;

async fn post_rpc(body: Vec<u8>) -> (StatusCode, NetworkPacket) {
    let state = AppState::from_settings(&ServerSettings::default()).unwrap();
    let response = router(state)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/rpc")
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, SiteletBincodeCodec::decode(&bytes).unwrap())
}

fn framed(packet: &NetworkPacket) -> Vec<u8> {
    SiteletBincodeCodec::encode(packet).unwrap()
}

#[tokio::test]
async fn reverse_string_over_http() {
    let request = NetworkPacket::wrap(&ReverseString::new("hello")).unwrap();
    let (status, reply) = post_rpc(framed(&request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply.unwrap_as::<Reversed>().unwrap().output, "olleh");
}

#[tokio::test]
async fn garbage_is_a_bad_request() {
    let (status, reply) = post_rpc(b"not a packet at all".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply.is::<RemoteFault>());
}

#[tokio::test]
async fn unknown_request_type_is_not_found() {
    let request = NetworkPacket::wrap(&Reversed {
        output: String::from("nobody serves this"),
    })
    .unwrap();
    let (status, reply) = post_rpc(framed(&request)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let fault: RemoteFault = reply.unwrap_as().unwrap();
    assert!(fault.message.contains("Reversed"), "{}", fault.message);
}

#[test]
fn hello_round_trips_through_widget_and_registry() {
    let registry = Arc::new(RemoteRegistry::site_api().unwrap());
    let session = Session::new();
    let mut pool = LocalPool::new();
    let remote = Rc::new(Remote::new(LoopbackTransport::new(registry)));
    let widget = Reverser::new(&session, remote, pool.spawner());

    widget.input().set(String::from("hello"));
    widget.send();
    assert_eq!(widget.reversed().get(), AsyncResult::Pending);

    pool.run_until_stalled();
    assert_eq!(
        widget.reversed().get(),
        AsyncResult::<String, RemoteError>::Success(String::from("olleh"))
    );
    assert!(widget.render().into_string().contains("<h1>olleh</h1>"));
}

#[test]
fn empty_input_stays_idle_through_the_registry() {
    let registry = Arc::new(RemoteRegistry::site_api().unwrap());
    let session = Session::new();
    let mut pool = LocalPool::new();
    let remote = Rc::new(Remote::new(LoopbackTransport::new(registry)));
    let widget = Reverser::new(&session, remote, pool.spawner());

    widget.send();
    pool.run_until_stalled();
    assert!(widget.reversed().get().is_idle());
    assert_eq!(widget.response_text(), "");
}
