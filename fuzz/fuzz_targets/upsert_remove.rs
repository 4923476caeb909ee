#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use completrie::config::IndexConfig;
use completrie::Index;

#[derive(Arbitrary, Debug)]
enum Op {
    Upsert { text: Vec<u8>, score: u32 },
    Remove { text: Vec<u8> },
    Search { query: Vec<u8> },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    hash_split_threshold: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: FuzzInput| {
    let mut config = IndexConfig::default();
    // Keep splits reachable within a small op budget.
    config.hash_split_threshold = 1 + input.hash_split_threshold as usize;
    let mut index = Index::new(config);

    for op in input.ops {
        match op {
            Op::Upsert { text, score } => {
                if !text.is_empty() {
                    index.upsert(&text, score).unwrap();
                }
            }
            Op::Remove { text } => {
                if !text.is_empty() {
                    // Removing an absent record is expected and not a bug.
                    let _ = index.remove(&text);
                }
            }
            Op::Search { query } => {
                let hits = index.search(&query);
                for pair in hits.windows(2) {
                    assert!(pair[0].score >= pair[1].score);
                }
            }
        }
    }
});
