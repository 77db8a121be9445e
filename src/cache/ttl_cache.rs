use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

// TTL 过大导致时间溢出时使用的过期上限（约 30 年）
const MAX_TTL: Duration = Duration::from_secs(30 * 365 * 24 * 3600);

struct CacheEntry<K, V> {
    key: K,
    value: V,
    expires_at: Instant,
    // 插入序号，越小越早插入
    seq: u64,
}

impl<K, V> CacheEntry<K, V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

struct CacheStore<K, V> {
    entries: HashMap<K, CacheEntry<K, V>>,
    insertion_order: BTreeMap<u64, K>,
    next_seq: u64,
}

impl<K: Hash + Eq + Clone, V> CacheStore<K, V> {
    fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.insertion_order.remove(&entry.seq);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.insertion_order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// 带过期时间的内存缓存
///
/// 过期检查是惰性的：没有后台清理线程，每次 `get` / `set` 时判断。
/// 容量满时插入新键会淘汰最早插入的条目。所有方法都可以在多个任务间并发调用。
pub struct TtlCache<K, V> {
    store: Mutex<CacheStore<K, V>>,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            store: Mutex::new(CacheStore {
                entries: HashMap::with_capacity(max_entries.min(1024)),
                insertion_order: BTreeMap::new(),
                next_seq: 0,
            }),
            max_entries,
        }
    }

    /// 读取未过期的值；发现过期条目时顺便删除
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let mut store = self.store.lock();
        match store.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        store.remove(key);
        None
    }

    /// 写入值，过期时间为 `now + ttl`；已存在的键会被覆盖并重新计时
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut store = self.store.lock();

        let existed = store.remove(&key).is_some();
        if !existed && store.entries.len() >= self.max_entries {
            if store.evict_oldest().is_some() {
                tracing::debug!("Cache full ({} entries), evicted oldest entry", self.max_entries);
            }
        }

        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(MAX_TTL))
            .unwrap_or(now);

        let seq = store.next_seq;
        store.next_seq += 1;
        store.insertion_order.insert(seq, key.clone());
        store.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                value,
                expires_at,
                seq,
            },
        );
    }

    /// 当前物理存储的条目数（可能包含尚未被访问到的过期条目）
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// 所有未过期的键，按插入顺序排列
    pub fn live_keys(&self) -> Vec<K> {
        let now = Instant::now();
        let store = self.store.lock();
        store
            .insertion_order
            .values()
            .filter_map(|k| store.entries.get(k))
            .filter(|e| !e.is_expired(now))
            .map(|e| e.key.clone())
            .collect()
    }
}
