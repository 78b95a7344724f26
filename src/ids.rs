use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, SystemTime},
};

use snowflake::SnowflakeIdGenerator;

/// Source of fresh row identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// 2010-11-04T01:42:54.657Z, the classic snowflake epoch.
pub const EPOCH_MS: u64 = 1_288_834_974_657;

const NODE_BITS: u32 = 10;
const STEP_BITS: u32 = 12;
pub const MAX_NODE: u16 = (1 << NODE_BITS) - 1;
const STEP_MASK: i64 = (1 << STEP_BITS) - 1;
const TIME_SHIFT: u32 = NODE_BITS + STEP_BITS;

/// Snowflake ids: `ms since epoch | node | per-ms step`.
///
/// The 10-bit node is split into the generator's 5-bit machine and node halves,
/// so the encoded layout is the plain `41 | 10 | 12` one.
pub struct Snowflake {
    inner: Mutex<SnowflakeIdGenerator>,
}

impl Snowflake {
    pub fn new(node: u16) -> anyhow::Result<Self> {
        anyhow::ensure!(node <= MAX_NODE, "node id {node} out of range 0..={MAX_NODE}");
        let epoch = SystemTime::UNIX_EPOCH + Duration::from_millis(EPOCH_MS);
        let machine = i32::from(node >> 5);
        let local = i32::from(node & 0x1f);
        Ok(Self {
            inner: Mutex::new(SnowflakeIdGenerator::with_epoch(machine, local, epoch)),
        })
    }
}

impl IdGenerator for Snowflake {
    fn next_id(&self) -> i64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
    }
}

/// Splits an id back into `(ms since epoch, node, step)`.
pub fn decompose(id: i64) -> (i64, u16, u16) {
    let ms = id >> TIME_SHIFT;
    let node = ((id >> STEP_BITS) & i64::from(MAX_NODE)) as u16;
    let step = (id & STEP_MASK) as u16;
    (ms, node, step)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let gen = Snowflake::new(1).unwrap();
        let ids: Vec<i64> = (0..10_000).map(|_| gen.next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| *id > 0));
    }

    #[test]
    fn node_is_encoded() {
        let gen = Snowflake::new(513).unwrap();
        let (ms, node, _) = decompose(gen.next_id());
        assert_eq!(node, 513);
        let now_ms = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        let since_epoch = now_ms - EPOCH_MS as i64;
        assert!((since_epoch - ms).abs() < 5_000, "timestamp {ms} vs {since_epoch}");
    }

    #[test]
    fn rejects_out_of_range_node() {
        assert!(Snowflake::new(MAX_NODE).is_ok());
        assert!(Snowflake::new(MAX_NODE + 1).is_err());
    }

    #[test]
    fn unique_across_threads() {
        let gen = Arc::new(Snowflake::new(7).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || (0..2_000).map(|_| gen.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
