#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

use std::collections::HashMap;

use keyed_slotmap::{ShrinkPolicy, SlotMap};

#[derive(Arbitrary, Debug)]
struct Target {
    ctor: Constructor,
    ops: Vec<Op>,
}

#[derive(Arbitrary, Debug)]
enum Constructor {
    New,
    WithCapacity(u8),
    WithPolicy(u8, u8),
}

#[derive(Arbitrary, Debug)]
enum Op {
    Reserve(u8),
    Insert(u8, char),
    Update(u8, char),
    Remove(u8),
    Retain(Vec<bool>),
    TryDeallocate,
    Clear,
    Drain,
}

fuzz_target!(|data: Target| {
    let mut map = match data.ctor {
        Constructor::New => SlotMap::new(),
        Constructor::WithCapacity(n) => SlotMap::with_capacity(n as usize),
        Constructor::WithPolicy(count, ratio) => {
            SlotMap::with_policy(ShrinkPolicy::new(count as usize, ratio as f64 / 255.0))
        }
    };
    let mut model = HashMap::new();

    for op in data.ops {
        match op {
            Op::Reserve(n) => map.reserve(n as usize),
            Op::Insert(k, v) => {
                assert_eq!(map.insert(k, v).replaced(), model.insert(k, v));
            }
            Op::Update(k, v) => {
                let expected = model.get_mut(&k).map(|old| std::mem::replace(old, v));
                assert_eq!(map.update(&k, v).into_result().ok(), expected);
            }
            Op::Remove(k) => assert_eq!(map.remove(&k), model.remove(&k)),
            Op::Retain(s) => {
                let mut keep: HashMap<u8, bool> = HashMap::new();
                let mut i = s.into_iter();
                map.retain(|k, _v| *keep.entry(*k).or_insert_with(|| i.next().unwrap_or(false)));
                model.retain(|k, _v| keep.get(k).cloned().unwrap_or(false));
            }
            Op::TryDeallocate => {
                let len = map.len();
                map.try_deallocate();
                assert_eq!(map.len(), len);
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
            Op::Drain => {
                assert_eq!(map.drain().count(), model.drain().count());
            }
        }

        assert_eq!(map.len(), model.len());
        assert!(map.len() <= map.dense_len());
        assert_eq!(map.iter().count(), map.len());
    }
});
