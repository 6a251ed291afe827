use std::sync::atomic::{AtomicI64, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: sequence within the millisecond
///
/// Ids are strictly increasing within one process. When a millisecond's
/// 4096 slots run out the generator moves on to the next millisecond
/// instead of wrapping, so a burst (e.g. a dues run) never repeats an id.
/// The first id of a process starts at a random sequence.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let base = ts << 12;

    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = if last == 0 {
            base | rand::thread_rng().gen_range(0..0x1000)
        } else if last >= base {
            last + 1
        } else {
            base
        };
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_snowflake_ids_unique_in_burst() {
        let ids: HashSet<i64> = (0..4000).map(|_| snowflake_id()).collect();
        assert_eq!(ids.len(), 4000);
    }

    #[test]
    fn test_snowflake_does_not_wrap_past_4096_per_ms() {
        let ids: Vec<i64> = (0..20_000).map(|_| snowflake_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_snowflake_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..5000).map(|_| snowflake_id()).collect::<Vec<_>>()))
            .collect();
        let ids: HashSet<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 20_000);
    }

    #[test]
    fn test_snowflake_fits_js_safe_integer() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }
}
