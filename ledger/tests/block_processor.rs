mod common;

use common::*;
use lattice_ledger::{BlockProcessor, ProcessResult};
use lattice_store::UncheckedStore;

#[test]
fn parked_open_is_replayed_once_its_source_arrives() {
    let f = Fixture::new();
    let x = key(2);
    let send = send(&f.genesis, f.genesis_hash(), x.account(), genesis_after(100));
    let open = open(&x, send.hash(), x.account());

    let processor = BlockProcessor::new(&f.store, &f.ledger);
    let results = processor.process_batch([open.clone(), send.clone()]).unwrap();

    let summary: Vec<_> = results
        .iter()
        .map(|entry| (entry.hash, entry.result.code, entry.replayed_from))
        .collect();
    assert_eq!(
        summary,
        vec![
            (open.hash(), ProcessResult::GapSource, None),
            (send.hash(), ProcessResult::Progress, None),
            (open.hash(), ProcessResult::Progress, Some(send.hash())),
        ]
    );
    assert_eq!(f.balance(&x.account()), raw(100));
    assert_eq!(f.read().unchecked_count().unwrap(), 0);
}

#[test]
fn chains_delivered_backwards_are_replayed_in_order() {
    let f = Fixture::new();
    let genesis = f.genesis_account();
    let first = send(&f.genesis, f.genesis_hash(), key(2).account(), genesis_after(1));
    let second = send(&f.genesis, first.hash(), key(2).account(), genesis_after(2));
    let third = send(&f.genesis, second.hash(), key(2).account(), genesis_after(3));

    let processor = BlockProcessor::new(&f.store, &f.ledger);
    let results = processor
        .process_batch([third.clone(), second.clone(), first.clone()])
        .unwrap();

    let progressed: Vec<_> = results
        .iter()
        .filter(|entry| entry.result.code == ProcessResult::Progress)
        .map(|entry| entry.hash)
        .collect();
    assert_eq!(progressed, vec![first.hash(), second.hash(), third.hash()]);
    assert_eq!(f.head(&genesis), Some(third.hash()));
    assert_eq!(f.read().unchecked_count().unwrap(), 0);
}

#[test]
fn parked_blocks_survive_across_batches() {
    let f = Fixture::new();
    let x = key(2);
    let send = send(&f.genesis, f.genesis_hash(), x.account(), genesis_after(7));
    let open = open(&x, send.hash(), x.account());
    let processor = BlockProcessor::new(&f.store, &f.ledger);

    let results = processor.process(open.clone()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result.code, ProcessResult::GapSource);
    assert_eq!(f.read().unchecked_get(&send.hash()).unwrap(), vec![open.clone()]);

    let results = processor.process(send).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].hash, open.hash());
    assert_eq!(results[1].result.code, ProcessResult::Progress);
    assert_eq!(f.balance(&x.account()), raw(7));
}

#[test]
fn rejected_blocks_do_not_release_dependents() {
    let f = Fixture::new();
    let x = key(2);
    let forged = send(&key(9), f.genesis_hash(), x.account(), genesis_after(1));
    let open = open(&x, forged.hash(), x.account());
    let processor = BlockProcessor::new(&f.store, &f.ledger);

    let results = processor.process_batch([open, forged.clone()]).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].result.code, ProcessResult::BadSignature);
    assert_eq!(f.read().unchecked_get(&forged.hash()).unwrap().len(), 1);
    assert!(!f.exists(&forged.hash()));
}
