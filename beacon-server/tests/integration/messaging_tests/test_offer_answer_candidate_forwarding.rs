use crate::integration::{init_tracing, spawn_relay};
use crate::utils::{TestClient, expect_user_joined, join_room};
use serde_json::json;

/// A and B share "r1". A's offer must reach B exactly once, verbatim, with
/// `from_user` set by the relay; the answer and candidate flow back the
/// same way. Payloads are opaque: object-shaped ones pass through intact.
#[tokio::test]
async fn test_offer_answer_candidate_forwarding() {
    init_tracing();
    let addr = spawn_relay().await;

    let mut a = TestClient::connect(addr, "A").await.expect("connect A");
    let mut b = TestClient::connect(addr, "B").await.expect("connect B");
    assert!(join_room(&mut a, "r1").await.expect("A joins").is_empty());
    assert_eq!(join_room(&mut b, "r1").await.expect("B joins"), vec!["A"]);
    expect_user_joined(&mut a, "B", "r1").await.expect("A sees B");

    a.send_json(&json!({
        "type": "webrtc_offer",
        "target_user": "B",
        "offer": "sdp1",
    }))
    .await
    .expect("send offer");

    assert_eq!(
        b.recv_json().await.expect("B got no offer"),
        json!({ "type": "webrtc_offer", "offer": "sdp1", "from_user": "A" })
    );
    b.expect_silence().await.expect("offer delivered twice");

    let answer = json!({ "sdp": "v=0\r\no=- 0 0 IN IP4 127.0.0.1", "kind": "answer" });
    b.send_json(&json!({
        "type": "webrtc_answer",
        "target_user": "A",
        "answer": answer,
    }))
    .await
    .expect("send answer");

    assert_eq!(
        a.recv_json().await.expect("A got no answer"),
        json!({ "type": "webrtc_answer", "answer": answer, "from_user": "B" })
    );

    let candidate = json!({ "candidate": "candidate:0 1 UDP 2122252543 10.0.0.1 54321 typ host" });
    a.send_json(&json!({
        "type": "ice_candidate",
        "target_user": "B",
        "candidate": candidate,
    }))
    .await
    .expect("send candidate");

    assert_eq!(
        b.recv_json().await.expect("B got no candidate"),
        json!({ "type": "ice_candidate", "candidate": candidate, "from_user": "A" })
    );

    a.close().await.expect("close A");
    b.close().await.expect("close B");
}

/// A client-supplied `from_user` field must not override the identity the
/// relay knows the sender by.
#[tokio::test]
async fn test_from_user_cannot_be_spoofed() {
    init_tracing();
    let addr = spawn_relay().await;

    let mut a = TestClient::connect(addr, "A").await.expect("connect A");
    let mut b = TestClient::connect(addr, "B").await.expect("connect B");

    a.send_json(&json!({
        "type": "webrtc_offer",
        "target_user": "B",
        "offer": "sdp1",
        "from_user": "mallory",
    }))
    .await
    .expect("send offer");

    assert_eq!(
        b.recv_json().await.expect("B got no offer")["from_user"],
        json!("A")
    );

    a.close().await.expect("close A");
    b.close().await.expect("close B");
}
