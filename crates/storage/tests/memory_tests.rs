//! MemoryStore lifecycle and TTL tests.
//!
//! TTL tests run with a paused tokio clock, so deadlines are exact rather
//! than sleep-and-hope.

use bytes::Bytes;
use deaddrop_storage::{MemoryStore, MessageStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::advance;

const TTL: Duration = Duration::from_secs(60);

fn payload() -> Bytes {
    Bytes::from_static(b"ciphertext")
}

#[tokio::test]
async fn reserve_is_exclusive_while_live() {
    let store = MemoryStore::new();
    assert!(store.reserve_code("AAAA2222", TTL).await.unwrap());
    assert!(!store.reserve_code("AAAA2222", TTL).await.unwrap());
    // A different code is unaffected.
    assert!(store.reserve_code("BBBB3333", TTL).await.unwrap());
}

#[tokio::test]
async fn attach_requires_a_reservation() {
    let store = MemoryStore::new();
    assert!(
        !store
            .attach_cipher("UNKNOWN9", payload(), TTL)
            .await
            .unwrap()
    );
    assert!(store.is_empty(), "failed attach must not create a record");
}

#[tokio::test]
async fn attach_happens_at_most_once() {
    let store = MemoryStore::new();
    assert!(store.reserve_code("AAAA2222", TTL).await.unwrap());
    assert!(store.attach_cipher("AAAA2222", payload(), TTL).await.unwrap());
    assert!(
        !store
            .attach_cipher("AAAA2222", Bytes::from_static(b"other"), TTL)
            .await
            .unwrap()
    );
    // The original payload survives the rejected second attach.
    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), Some(payload()));
}

#[tokio::test]
async fn take_is_destructive() {
    let store = MemoryStore::new();
    store.reserve_code("AAAA2222", TTL).await.unwrap();
    store.attach_cipher("AAAA2222", payload(), TTL).await.unwrap();

    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), Some(payload()));
    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn placeholder_is_not_retrievable() {
    let store = MemoryStore::new();
    store.reserve_code("AAAA2222", TTL).await.unwrap();
    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), None);
    // The placeholder survives the failed retrieval and can still be attached.
    assert!(store.attach_cipher("AAAA2222", payload(), TTL).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn placeholder_expires_and_frees_the_code() {
    let store = MemoryStore::new();
    store
        .reserve_code("AAAA2222", Duration::from_secs(10))
        .await
        .unwrap();

    advance(Duration::from_secs(11)).await;

    assert!(
        !store
            .attach_cipher("AAAA2222", payload(), TTL)
            .await
            .unwrap(),
        "attach after placeholder expiry must conflict"
    );
    assert!(
        store
            .reserve_code("AAAA2222", Duration::from_secs(10))
            .await
            .unwrap(),
        "an expired code is reusable"
    );
}

#[tokio::test(start_paused = true)]
async fn attach_resets_the_ttl() {
    let store = MemoryStore::new();
    store
        .reserve_code("AAAA2222", Duration::from_secs(10))
        .await
        .unwrap();

    // Attach just before the placeholder would have expired.
    advance(Duration::from_secs(9)).await;
    assert!(
        store
            .attach_cipher("AAAA2222", payload(), Duration::from_secs(60))
            .await
            .unwrap()
    );

    // Well past the placeholder deadline but inside the message TTL.
    advance(Duration::from_secs(59)).await;
    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), Some(payload()));
}

#[tokio::test(start_paused = true)]
async fn attached_message_expires() {
    let store = MemoryStore::new();
    store
        .reserve_code("AAAA2222", Duration::from_secs(10))
        .await
        .unwrap();
    store
        .attach_cipher("AAAA2222", payload(), Duration::from_secs(60))
        .await
        .unwrap();

    advance(Duration::from_secs(61)).await;

    assert_eq!(store.get_and_delete("AAAA2222").await.unwrap(), None);
    assert!(store.reserve_code("AAAA2222", TTL).await.unwrap());
}

#[tokio::test]
async fn concurrent_takes_yield_exactly_one_payload() {
    let store = Arc::new(MemoryStore::new());
    store.reserve_code("AAAA2222", TTL).await.unwrap();
    store.attach_cipher("AAAA2222", payload(), TTL).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.get_and_delete("AAAA2222").await.unwrap()
        }));
    }

    let mut hits = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            hits += 1;
        }
    }
    assert_eq!(hits, 1, "exactly one racer may observe the payload");
}

#[tokio::test]
async fn concurrent_reservations_admit_one_winner() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.reserve_code("AAAA2222", TTL).await.unwrap()
        }));
    }

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1);
}
