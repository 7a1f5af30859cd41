mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::account;
use lattice_nullables::NullStore;
use lattice_store::{
    Store, Table, VoteCacheFlusher, VoteSequenceCache, VoteSequenceStore,
};

fn flush(store: &NullStore, cache: &VoteSequenceCache) -> usize {
    let mut txn = store.begin_write(&[Table::VoteSequence]).unwrap();
    let written = cache.flush(txn.as_mut()).unwrap();
    txn.commit().unwrap();
    written
}

#[test]
fn unknown_account_reads_zero() {
    let store = NullStore::new();
    let cache = VoteSequenceCache::new();
    let txn = store.begin_read().unwrap();
    assert_eq!(cache.read(txn.as_ref(), &account(1)).unwrap(), 0);
}

#[test]
fn bump_is_visible_before_flush() {
    let store = NullStore::new();
    let cache = VoteSequenceCache::new();
    let txn = store.begin_read().unwrap();
    assert_eq!(cache.bump(txn.as_ref(), &account(1)).unwrap(), 1);
    assert_eq!(cache.bump(txn.as_ref(), &account(1)).unwrap(), 2);
    assert_eq!(cache.read(txn.as_ref(), &account(1)).unwrap(), 2);
    assert_eq!(txn.vote_sequence_get(&account(1)).unwrap(), None);
}

#[test]
fn flush_persists_and_rotates() {
    let store = NullStore::new();
    let cache = VoteSequenceCache::new();
    {
        let txn = store.begin_read().unwrap();
        cache.bump(txn.as_ref(), &account(1)).unwrap();
        cache.bump(txn.as_ref(), &account(2)).unwrap();
    }
    assert_eq!(flush(&store, &cache), 2);
    assert_eq!(cache.len(), 2);

    // Nothing new since the last flush.
    assert_eq!(flush(&store, &cache), 0);
    assert!(cache.is_empty());

    let txn = store.begin_read().unwrap();
    assert_eq!(txn.vote_sequence_get(&account(1)).unwrap(), Some(1));
    assert_eq!(cache.read(txn.as_ref(), &account(2)).unwrap(), 1);
    assert_eq!(cache.bump(txn.as_ref(), &account(2)).unwrap(), 2);
}

#[test]
fn observe_keeps_the_highest_sequence() {
    let store = NullStore::new();
    let cache = VoteSequenceCache::new();
    let txn = store.begin_read().unwrap();
    assert_eq!(cache.observe(txn.as_ref(), &account(1), 10).unwrap(), 10);
    assert_eq!(cache.observe(txn.as_ref(), &account(1), 4).unwrap(), 10);
    assert_eq!(cache.bump(txn.as_ref(), &account(1)).unwrap(), 11);
}

#[test]
fn concurrent_bumps_hand_out_distinct_sequences() {
    let store = NullStore::new();
    let cache = VoteSequenceCache::new();
    let mut all: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let txn = store.begin_read().unwrap();
                    (0..25)
                        .map(|_| cache.bump(txn.as_ref(), &account(7)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    all.sort_unstable();
    assert_eq!(all, (1..=100).collect::<Vec<u64>>());
}

fn stored(store: &NullStore, byte: u8) -> Option<u64> {
    store
        .begin_read()
        .unwrap()
        .vote_sequence_get(&account(byte))
        .unwrap()
}

#[test]
fn flusher_writes_on_every_tick() {
    let store = Arc::new(NullStore::new());
    let cache = Arc::new(VoteSequenceCache::new());
    cache
        .bump(store.begin_read().unwrap().as_ref(), &account(1))
        .unwrap();

    let shared: Arc<dyn Store> = store.clone();
    let flusher =
        VoteCacheFlusher::spawn(shared, Arc::clone(&cache), Duration::from_millis(10)).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while stored(&store, 1).is_none() {
        assert!(Instant::now() < deadline, "no flush within the deadline");
        std::thread::sleep(Duration::from_millis(5));
    }
    flusher.stop();
    assert_eq!(stored(&store, 1), Some(1));
}

#[test]
fn stopping_the_flusher_flushes_once_more() {
    let store = Arc::new(NullStore::new());
    let cache = Arc::new(VoteSequenceCache::new());
    let shared: Arc<dyn Store> = store.clone();
    let flusher =
        VoteCacheFlusher::spawn(shared, Arc::clone(&cache), Duration::from_secs(3600)).unwrap();

    cache
        .bump(store.begin_read().unwrap().as_ref(), &account(2))
        .unwrap();
    assert_eq!(stored(&store, 2), None);
    drop(flusher);
    assert_eq!(stored(&store, 2), Some(1));
}
