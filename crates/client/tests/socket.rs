use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hexchat_client::ws::{socket_io_url, ConnectionState, ReconnectConfig, SocketIoConnection};
use hexchat_client::{ChatStore, RealtimeListener};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// How the fake server answers the namespace connect.
#[derive(Clone, Copy)]
enum Namespace {
    Refuse,
    /// Join, then push one `newChannel` event.
    JoinAndPush,
}

/// Minimal socket.io endpoint. Returns its ws base URL and a dial counter.
async fn spawn_socket_server(namespace: Namespace) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let dials = Arc::new(AtomicUsize::new(0));
    let counter = dials.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                ws.send(Message::text(r#"0{"sid":"abc","pingInterval":25000}"#))
                    .await
                    .unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    if text.as_str() != "40" {
                        continue;
                    }
                    match namespace {
                        Namespace::Refuse => {
                            let _ = ws.send(Message::text(r#"44{"message":"invalid token"}"#)).await;
                            return;
                        }
                        Namespace::JoinAndPush => {
                            ws.send(Message::text(r#"40{"sid":"ns"}"#)).await.unwrap();
                            ws.send(Message::text(
                                r#"42["newChannel",{"id":7,"name":"dev","removable":true}]"#,
                            ))
                            .await
                            .unwrap();
                        }
                    }
                }
            });
        }
    });

    (format!("ws://{addr}"), dials)
}

fn quick_retries(max: u32) -> ReconnectConfig {
    ReconnectConfig {
        max_attempts: Some(max),
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        multiplier: 1.0,
    }
}

#[tokio::test]
async fn refused_handshake_counts_as_failed_attempt() {
    let (base, dials) = spawn_socket_server(Namespace::Refuse).await;
    let socket = SocketIoConnection::connect(socket_io_url(&base, Some("expired")), quick_retries(2));

    let mut state = socket.watch_state();
    let failed = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| matches!(s, ConnectionState::Failed { .. })),
    )
    .await
    .map(|seen| seen.is_ok());

    assert_eq!(failed, Ok(true));
    // The first dial plus two retries.
    assert_eq!(dials.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn joined_socket_feeds_pushes_to_store() {
    let (base, _dials) = spawn_socket_server(Namespace::JoinAndPush).await;
    let socket = SocketIoConnection::connect(socket_io_url(&base, None), quick_retries(2));
    let store = ChatStore::in_memory();
    RealtimeListener::attach(&socket, &store);

    let mut revisions = store.subscribe();
    let arrived = tokio::time::timeout(Duration::from_secs(5), async {
        while !store.select(|s| s.has_channel(7)) {
            revisions.changed().await.unwrap();
        }
    })
    .await;

    assert!(arrived.is_ok());
    assert!(socket.state().is_connected());
}
