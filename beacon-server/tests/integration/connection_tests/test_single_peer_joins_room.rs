use crate::integration::{init_tracing, spawn_relay};
use crate::utils::{TestClient, join_room};

#[tokio::test]
async fn test_single_peer_joins_room() {
    init_tracing();
    let addr = spawn_relay().await;

    let mut a = TestClient::connect(addr, "A").await.expect("connect A");

    let participants = join_room(&mut a, "r1").await.expect("join failed");
    assert!(
        participants.is_empty(),
        "first joiner should see an empty room, got {participants:?}"
    );

    a.expect_silence().await.expect("unexpected traffic for A");
    a.close().await.expect("close A");
}
