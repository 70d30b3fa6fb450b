use std::collections::BTreeMap;

use rollcall_core::HandshakeMessage;
use rollcall_net::{announce, announce_all};

use crate::*;

/// B is started with A in its peer list. After B's dialer is done, A knows
/// exactly B and B knows nobody: there is no reply.
#[tokio::test]
async fn test_two_node_announcement() -> Result<()> {
    let mut a = TestNode::start("A", ":9001").await?;
    let mut b = TestNode::start("B", ":9002").await?;

    let delivered = announce_all(&b.node, [a.dial_addr()]).await;
    assert_eq!(delivered, 1);

    assert_eq!(a.next_event().await?, registered("B", ":9002"));
    assert_eq!(
        a.node.registry().snapshot(),
        BTreeMap::from([("B".to_string(), ":9002".to_string())])
    );

    b.expect_quiet(Duration::from_millis(200)).await;
    assert!(b.node.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mutual_announcement() -> Result<()> {
    let mut a = TestNode::start("A", ":9001").await?;
    let mut b = TestNode::start("B", ":9002").await?;

    announce(&a.node, &b.dial_addr()).await?;
    announce(&b.node, &a.dial_addr()).await?;

    assert_eq!(b.next_event().await?, registered("A", ":9001"));
    assert_eq!(a.next_event().await?, registered("B", ":9002"));
    Ok(())
}

#[tokio::test]
async fn test_distinct_announcers_all_recorded() -> Result<()> {
    let mut hub = TestNode::start("hub", ":9000").await?;
    const N: usize = 20;

    let mut sends = Vec::new();
    for i in 0..N {
        let target = hub.listen_addr;
        sends.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(target).await?;
            let hello = HandshakeMessage::hello(format!("node-{i}"), format!("10.0.0.{i}:9000"));
            stream.write_all(&hello.encode()).await?;
            anyhow::Ok(())
        }));
    }
    for send in sends {
        send.await??;
    }

    for _ in 0..N {
        assert!(matches!(hub.next_event().await?, Event::Registered { .. }));
    }

    let snapshot = hub.node.registry().snapshot();
    assert_eq!(snapshot.len(), N);
    for i in 0..N {
        assert_eq!(snapshot[&format!("node-{i}")], format!("10.0.0.{i}:9000"));
    }
    Ok(())
}

#[tokio::test]
async fn test_reannouncement_overwrites_address() -> Result<()> {
    let mut a = TestNode::start("A", ":9001").await?;

    a.send_raw(&HandshakeMessage::hello("B", ":9002").encode()).await?;
    assert_eq!(a.next_event().await?, registered("B", ":9002"));

    a.send_raw(&HandshakeMessage::hello("B", "10.1.1.1:9002").encode()).await?;
    assert_eq!(a.next_event().await?, registered("B", "10.1.1.1:9002"));

    assert_eq!(a.node.registry().len(), 1);
    assert_eq!(a.node.registry().get("B").as_deref(), Some("10.1.1.1:9002"));
    Ok(())
}

#[tokio::test]
async fn test_short_form_peer_address_dials_localhost() -> Result<()> {
    let mut a = TestNode::start("A", ":9001").await?;
    let b = TestNode::start("B", ":9002").await?;

    let short = format!(":{}", a.listen_addr.port());
    announce(&b.node, &short).await?;

    assert_eq!(a.next_event().await?, registered("B", ":9002"));
    Ok(())
}
