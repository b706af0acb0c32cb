use crate::integration::{init_tracing, spawn_relay};
use crate::utils::{TestClient, expect_user_joined, expect_user_left, join_room, leave_room};

/// An explicit `leave_room` notifies the remaining members but not the
/// leaver, and only that room's membership changes.
#[tokio::test]
async fn test_peer_leaves_others_stay() {
    init_tracing();
    let addr = spawn_relay().await;

    let mut a = TestClient::connect(addr, "A").await.expect("connect A");
    let mut b = TestClient::connect(addr, "B").await.expect("connect B");
    let mut c = TestClient::connect(addr, "C").await.expect("connect C");

    assert!(join_room(&mut a, "r1").await.expect("A joins").is_empty());
    assert_eq!(join_room(&mut b, "r1").await.expect("B joins"), vec!["A"]);
    expect_user_joined(&mut a, "B", "r1").await.expect("A sees B");
    assert_eq!(
        join_room(&mut c, "r1").await.expect("C joins"),
        vec!["A", "B"]
    );
    expect_user_joined(&mut a, "C", "r1").await.expect("A sees C");
    expect_user_joined(&mut b, "C", "r1").await.expect("B sees C");

    leave_room(&mut b, "r1").await.expect("B leaves");

    expect_user_left(&mut a, "B", "r1").await.expect("A not told B left");
    expect_user_left(&mut c, "B", "r1").await.expect("C not told B left");
    b.expect_silence()
        .await
        .expect("leaver received its own notification");

    // B stayed connected and can rejoin; the others never left
    assert_eq!(
        join_room(&mut b, "r1").await.expect("B rejoins"),
        vec!["A", "C"]
    );
    expect_user_joined(&mut a, "B", "r1").await.expect("A sees B rejoin");
    expect_user_joined(&mut c, "B", "r1").await.expect("C sees B rejoin");

    a.close().await.expect("close A");
    b.close().await.expect("close B");
    c.close().await.expect("close C");
}
