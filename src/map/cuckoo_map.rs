//! Cuckoo哈希表核心实现

use std::fmt;
use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::CuckooError;
use crate::hash::{default_hasher_pair, DoubleHasher, Hasher64};
use crate::map::bucket::BucketArray;
use crate::map::{DEFAULT_BUCKET_COUNT, DEFAULT_BYTES_PER_KEY, DEFAULT_KEYS_PER_BUCKET};
use crate::stats::{format_bytes, MapStats};
use crate::types::Entry;

/// 哈希表配置
#[derive(Clone, Debug)]
pub struct CuckooMapConfig {
    /// 键宽（字节），所有键必须恰好这么长
    pub bytes_per_key: u32,
    /// 每桶槽位数
    pub keys_per_bucket: u32,
    /// 初始桶数，构造时向上取整到2的幂
    pub bucket_count: u32,
    /// 踢出停滞时是否允许桶数组翻倍
    pub expandable: bool,
}

impl Default for CuckooMapConfig {
    fn default() -> Self {
        Self {
            bytes_per_key: DEFAULT_BYTES_PER_KEY,
            keys_per_bucket: DEFAULT_KEYS_PER_BUCKET,
            bucket_count: DEFAULT_BUCKET_COUNT,
            expandable: true,
        }
    }
}

/// Cuckoo哈希表 - 定宽字节键到变长字节值的内存映射
///
/// 每个键有两个候选桶：主桶取主哈希低32位按掩码截断，备桶由主桶号
/// XOR一个按键推导的项得到，因此互为反函数。桶内线性踢出，单次插入
/// 的置换链长不超过每桶槽位数；停滞时可选地将桶数组翻倍并原位重排。
///
/// 结构内部没有任何同步，多线程并发使用属于未定义契约。
pub struct CuckooMap {
    buckets: BucketArray,
    hasher: DoubleHasher,
    bucket_power: u32,
    expandable: bool,
    expansion_count: u32,
    // 放置路径上备索引与主索引重合的次数，查询路径不记录
    zero_hash2_count: u64,
    // 踢出起始桶的随机源，与哈希种子相互独立
    kick_rng: StdRng,
}

impl CuckooMap {
    /// 创建新哈希表，种子取自时钟
    pub fn new(
        config: CuckooMapConfig,
        hasher1: Box<dyn Hasher64>,
        hasher2: Box<dyn Hasher64>,
    ) -> Result<Self, CuckooError> {
        Self::build(config, DoubleHasher::new(hasher1, hasher2))
    }

    /// 以指定种子创建，哈希索引与踢出序列均可复现
    pub fn with_seed(
        config: CuckooMapConfig,
        hasher1: Box<dyn Hasher64>,
        hasher2: Box<dyn Hasher64>,
        seed1: u64,
    ) -> Result<Self, CuckooError> {
        Self::build(config, DoubleHasher::with_seed(hasher1, hasher2, seed1))
    }

    /// 使用默认哈希函数组合创建
    pub fn with_default_hashers(config: CuckooMapConfig) -> Result<Self, CuckooError> {
        let (hasher1, hasher2) = default_hasher_pair();
        Self::new(config, hasher1, hasher2)
    }

    fn build(config: CuckooMapConfig, hasher: DoubleHasher) -> Result<Self, CuckooError> {
        if config.bytes_per_key == 0 {
            return Err(CuckooError::InvalidArgument {
                reason: "bytes_per_key 必须至少为1".into(),
            });
        }
        if config.keys_per_bucket == 0 {
            return Err(CuckooError::InvalidArgument {
                reason: "keys_per_bucket 必须至少为1".into(),
            });
        }
        if config.bucket_count == 0 {
            return Err(CuckooError::InvalidArgument {
                reason: "bucket_count 必须至少为1".into(),
            });
        }
        let bucket_count = config.bucket_count.checked_next_power_of_two().ok_or_else(|| {
            CuckooError::InvalidArgument {
                reason: format!("bucket_count {} 取整后超出32位索引", config.bucket_count),
            }
        })?;

        let kick_rng = StdRng::seed_from_u64(hasher.seed1());
        Ok(Self {
            buckets: BucketArray::allocate(bucket_count, config.keys_per_bucket, config.bytes_per_key),
            hasher,
            bucket_power: bucket_count.trailing_zeros(),
            expandable: config.expandable,
            expansion_count: 0,
            zero_hash2_count: 0,
            kick_rng,
        })
    }

    pub fn bytes_per_key(&self) -> u32 {
        self.buckets.bytes_per_key()
    }

    pub fn keys_per_bucket(&self) -> u32 {
        self.buckets.keys_per_bucket()
    }

    pub fn bucket_count(&self) -> u32 {
        self.buckets.bucket_count()
    }

    pub fn bucket_power(&self) -> u32 {
        self.bucket_power
    }

    pub fn expandable(&self) -> bool {
        self.expandable
    }

    /// 成功扩容的次数
    pub fn expansion_count(&self) -> u32 {
        self.expansion_count
    }

    /// 放置路径上备索引与主索引重合的次数，仅供诊断
    pub fn zero_hash2_count(&self) -> u64 {
        self.zero_hash2_count
    }

    pub fn seed1(&self) -> u64 {
        self.hasher.seed1()
    }

    pub fn seed2(&self) -> u64 {
        self.hasher.seed2()
    }

    /// 当前条目数
    pub fn count(&self) -> u64 {
        self.buckets.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// 所有条目的值字节总和
    pub fn values_byte_count(&self) -> u64 {
        self.buckets.values_byte_count()
    }

    /// 负载因子 = 条目数 / 槽位总数
    pub fn load_factor(&self) -> f64 {
        self.count() as f64 / self.buckets.capacity() as f64
    }

    /// 估算桶数组占用的内存字节数，内部指针开销不计
    pub fn memory_in_bytes(&self) -> u64 {
        self.buckets.capacity() + u64::from(self.bytes_per_key()) * self.count() + self.values_byte_count()
    }

    /// 运行状态快照
    pub fn stats(&self) -> MapStats {
        MapStats {
            count: self.count(),
            capacity: self.buckets.capacity(),
            bucket_count: self.bucket_count(),
            load_factor: self.load_factor(),
            values_byte_count: self.values_byte_count(),
            memory_in_bytes: self.memory_in_bytes(),
            expansion_count: self.expansion_count,
            zero_hash2_count: self.zero_hash2_count,
        }
    }

    fn mask(&self) -> u32 {
        self.bucket_count() - 1
    }

    fn hash1(&self, key: &[u8]) -> u32 {
        self.hasher.hash1_raw(key) & self.mask()
    }

    // 备桶索引，供不允许改动可见状态的查询路径使用
    fn hash2_quiet(&self, key: &[u8], h1: u32) -> u32 {
        self.hasher.hash2_raw(key, h1) & self.mask()
    }

    // 备桶索引；与主桶重合时计入诊断计数（单桶退化场景不计）
    fn hash2(&mut self, key: &[u8], h1: u32) -> u32 {
        let h2 = self.hash2_quiet(key, h1);
        if h2 == h1 && self.bucket_power != 0 {
            self.zero_hash2_count += 1;
        }
        h2
    }

    /// 定位键所在的 (桶, 槽位)
    ///
    /// 先扫主桶再扫备桶，键长不符直接视为不存在。不分配内存。
    fn locate(&self, key: &[u8]) -> Option<(u32, u32)> {
        if key.len() != self.bytes_per_key() as usize {
            return None;
        }

        let h1 = self.hash1(key);
        if let Some(s) = self.buckets.find_key(h1, key) {
            return Some((h1, s));
        }

        let h2 = self.hash2_quiet(key, h1);
        if h2 != h1 {
            if let Some(s) = self.buckets.find_key(h2, key) {
                return Some((h2, s));
            }
        }
        None
    }

    /// 查找键对应的值
    ///
    /// 返回的借用在下一次修改表之前有效。
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let (b, s) = self.locate(key)?;
        let bpk = self.bytes_per_key() as usize;
        self.buckets.get(b, s).map(|e| e.value(bpk))
    }

    /// 查找键对应的值，不存在时返回给定默认值
    pub fn get_or<'a>(&'a self, key: &[u8], default: &'a [u8]) -> &'a [u8] {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.locate(key).is_some()
    }

    /// 线性扫描判断值是否存在
    ///
    /// 代价为O(槽位总数)，应尽量避免频繁调用。
    pub fn contains_value(&self, value: &[u8]) -> bool {
        !self.buckets.for_each(|_, v| v != value)
    }

    /// 只读遍历全部键值对，回调返回false时提前终止
    ///
    /// 返回是否完整遍历了全部条目。
    pub fn for_each<F>(&self, f: F) -> bool
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.buckets.for_each(f)
    }

    /// 键值对迭代器，顺序无语义
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.buckets.iter()
    }

    fn check_key(&self, key: &[u8]) -> Result<(), CuckooError> {
        if key.len() != self.bytes_per_key() as usize {
            return Err(CuckooError::InvalidArgument {
                reason: format!("键长 {} 与配置的 {} 不符", key.len(), self.bytes_per_key()),
            });
        }
        Ok(())
    }

    /// 插入或覆盖，返回覆盖前的旧值
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, CuckooError> {
        self.check_key(key)?;
        if let Some((b, s)) = self.locate(key) {
            let old = self.buckets.swap(b, s, Entry::new(key, value));
            self.sanity_check();
            return Ok(Some(old.into_value(self.bytes_per_key() as usize)));
        }
        self.insert_entry(Entry::new(key, value))?;
        self.sanity_check();
        Ok(None)
    }

    /// 仅当键不存在时插入；键已存在时返回现有值且不做任何修改
    pub fn put_if_absent(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>, CuckooError> {
        self.check_key(key)?;
        if let Some((b, s)) = self.locate(key) {
            let bpk = self.bytes_per_key() as usize;
            let existing = self
                .buckets
                .get(b, s)
                .map(|e| e.value(bpk).to_vec())
                .expect("定位到的槽位必然占用");
            return Ok(Some(existing));
        }
        self.insert_entry(Entry::new(key, value))?;
        self.sanity_check();
        Ok(None)
    }

    /// 删除键并返回其值
    pub fn del(&mut self, key: &[u8]) -> Result<Vec<u8>, CuckooError> {
        self.check_key(key)?;
        match self.locate(key) {
            Some((b, s)) => {
                let entry = self.buckets.take(b, s).expect("定位到的槽位必然占用");
                self.sanity_check();
                Ok(entry.into_value(self.bytes_per_key() as usize))
            }
            None => Err(CuckooError::KeyNotFound { key: hex_key(key) }),
        }
    }

    /// 清空全部条目
    ///
    /// 桶数、扩容计数与种子保持构造后的状态不变。
    pub fn clear(&mut self) {
        self.buckets.clear();
        log_debug!("表已清空: buckets={}", self.bucket_count());
        self.sanity_check();
    }

    // 常规插入路径：先试两个候选桶的空槽位，再进入踢出
    fn insert_entry(&mut self, entry: Entry) -> Result<(), CuckooError> {
        let bpk = self.bytes_per_key() as usize;

        let h1 = self.hash1(entry.key(bpk));
        if let Some(s) = self.buckets.first_empty_slot(h1) {
            self.buckets.set(h1, s, entry);
            return Ok(());
        }

        let h2 = self.hash2(entry.key(bpk), h1);
        if h2 != h1 {
            if let Some(s) = self.buckets.first_empty_slot(h2) {
                self.buckets.set(h2, s, entry);
                return Ok(());
            }
        }

        // 两个候选桶都满，用一位随机数决定从哪个桶开始踢出
        let h = if self.kick_rng.gen::<u64>() & 1 == 0 { h2 } else { h1 };
        self.kick_insert(entry, h)
    }

    /// 踢出插入：待插条目逐槽换入，被置换者尝试迁往其备桶
    ///
    /// 桶内线性推进而非多桶随机游走，单次尝试的置换链长不超过
    /// keys_per_bucket，插入代价因此有界。
    fn kick_insert(&mut self, entry: Entry, h: u32) -> Result<(), CuckooError> {
        let bpk = self.bytes_per_key() as usize;
        let mut pending = entry;
        for s in 0..self.keys_per_bucket() {
            pending = self.buckets.swap(h, s, pending);
            let alt = self.hash2(pending.key(bpk), h);
            if let Some(free) = self.buckets.first_empty_slot(alt) {
                self.buckets.set(alt, free, pending);
                return Ok(());
            }
        }

        let can_expand = self.expandable && self.bucket_count() <= u32::MAX >> 1;
        if !can_expand {
            // 槽位0此刻放着最初的待插条目，用最后被置换的条目换回去；
            // 桶内容相当于循环右移一位，交换自身会把字节计数修正回原值
            let _abandoned = self.buckets.swap(h, 0, pending);
            self.sanity_check();
            return Err(CuckooError::BucketFull {
                capacity: self.buckets.capacity(),
                count: self.count(),
                load_factor: self.load_factor(),
            });
        }

        log_debug!("桶 {} 踢出停滞，扩容后重插 (当前桶数 {})", h, self.bucket_count());
        self.expand();
        self.insert_entry(pending)
    }

    /// 桶数组翻倍并原位重排
    ///
    /// 依据未掩码的原始哈希决定每个条目落在 `i` 还是 `i + 旧桶数`，
    /// 槽位号保持不变，无需重新执行Cuckoo放置。
    fn expand(&mut self) {
        let old_mask = self.mask();
        let old_bucket_count = self.bucket_count();
        let new_bucket_count = old_bucket_count << 1;
        let new_mask = new_bucket_count - 1;
        let keys_per_bucket = self.keys_per_bucket();
        let bytes_per_key = self.bytes_per_key();

        let old = std::mem::replace(
            &mut self.buckets,
            BucketArray::allocate(new_bucket_count, keys_per_bucket, bytes_per_key),
        );

        let bpk = bytes_per_key as usize;
        for (b, s, entry) in old.into_entries() {
            let key = entry.key(bpk);
            let r1 = self.hasher.hash1_raw(key);
            let raw = if r1 & old_mask == b {
                r1
            } else {
                let r2 = self.hasher.hash2_raw(key, r1);
                debug_assert_eq!(r2 & old_mask, b, "条目既不在主桶也不在备桶");
                r2
            };
            let h = raw & new_mask;
            debug_assert!(h == b || h == b + old_bucket_count);
            self.buckets.set(h, s, entry);
        }

        self.bucket_power += 1;
        self.expansion_count += 1;
        log_info!(
            "扩容完成: {} -> {} 桶, 累计第 {} 次",
            old_bucket_count,
            new_bucket_count,
            self.expansion_count
        );
        self.sanity_check();
    }

    // 内部一致性校验，仅调试构建生效；失败说明实现有bug
    fn sanity_check(&self) {
        #[cfg(debug_assertions)]
        {
            self.assert_count();
            self.assert_position();
        }
    }

    #[cfg(debug_assertions)]
    fn assert_count(&self) {
        assert_eq!(self.bucket_count(), 1u32 << self.bucket_power);
        assert!(self.count() <= self.buckets.capacity());

        let mut count = 0u64;
        let mut value_bytes = 0u64;
        self.buckets.for_each(|_, v| {
            count += 1;
            value_bytes += v.len() as u64;
            true
        });
        assert_eq!(count, self.count(), "条目计数与实际内容不符");
        assert_eq!(value_bytes, self.values_byte_count(), "值字节计数与实际内容不符");
    }

    #[cfg(debug_assertions)]
    fn assert_position(&self) {
        let bpk = self.bytes_per_key() as usize;
        for b in 0..self.bucket_count() {
            for s in 0..self.keys_per_bucket() {
                if let Some(entry) = self.buckets.get(b, s) {
                    let key = entry.key(bpk);
                    let h1 = self.hash1(key);
                    if h1 != b {
                        assert_eq!(self.hash2_quiet(key, h1), b, "条目不在任一候选桶中");
                    }
                }
            }
        }
    }
}

impl Default for CuckooMap {
    fn default() -> Self {
        Self::with_default_hashers(crate::map::DEFAULT_CONFIG.clone()).expect("默认配置必定合法")
    }
}

impl fmt::Display for CuckooMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CuckooMap(bytes_per_key={}, keys_per_bucket={}, buckets={}, count={}, load_factor={:.2}, memory={}, expansions={})",
            self.bytes_per_key(),
            self.keys_per_bucket(),
            self.bucket_count(),
            self.count(),
            self.load_factor(),
            format_bytes(self.memory_in_bytes()),
            self.expansion_count,
        )
    }
}

fn hex_key(key: &[u8]) -> String {
    let mut s = String::with_capacity(key.len() * 2);
    for byte in key {
        let _ = write!(s, "{:02X}", byte);
    }
    s
}
