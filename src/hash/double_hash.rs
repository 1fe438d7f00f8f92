//! 双哈希索引推导 - 主/备桶索引的原始哈希计算

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::hash::{simple_hash, Hasher64};

/// 双哈希推导器 - 持有两个哈希函数和两个种子
///
/// 种子2由种子1确定性推导：`seed2 = seed1 * 17`（回绕乘法），
/// 因此给定单个种子源即可复现全部索引序列。
pub struct DoubleHasher {
    hasher1: Box<dyn Hasher64>,
    hasher2: Box<dyn Hasher64>,
    seed1: u64,
    seed2: u64,
}

impl DoubleHasher {
    /// 以时钟种子创建
    pub fn new(hasher1: Box<dyn Hasher64>, hasher2: Box<dyn Hasher64>) -> Self {
        Self::with_seed(hasher1, hasher2, clock_seed())
    }

    /// 以指定种子创建，索引序列可复现
    pub fn with_seed(hasher1: Box<dyn Hasher64>, hasher2: Box<dyn Hasher64>, seed1: u64) -> Self {
        Self {
            hasher1,
            hasher2,
            seed1,
            seed2: seed1.wrapping_mul(17),
        }
    }

    pub fn seed1(&self) -> u64 {
        self.seed1
    }

    pub fn seed2(&self) -> u64 {
        self.seed2
    }

    /// 主哈希的低32位原始值，掩码前
    pub fn hash1_raw(&self, key: &[u8]) -> u32 {
        self.hasher1.hash64_with_seed(key, self.seed1) as u32
    }

    /// 备哈希原始值：`h1 ^ term`
    ///
    /// 用XOR在主备索引之间互换，使得仅凭条目当前所在的桶号就能
    /// 算出另一候选桶：`hash2_raw(key, hash2_raw(key, h)) == h`。
    /// 次哈希低32位为零时逐级退回简单哈希，避免 h2 恒等于 h1。
    pub fn hash2_raw(&self, key: &[u8], h1: u32) -> u32 {
        let mut hh = self.hasher2.hash64_with_seed(key, self.seed2);
        let mut h = hh as u32;
        if h == 0 {
            let hh2 = simple_hash(key);
            h = hh2 as u32;
            if h == 0 {
                while hh != 0 {
                    h = (hh ^ hh2) as u32;
                    if h != 0 {
                        break;
                    }
                    hh >>= 8;
                }
                // 到这里仍为零的概率可以忽略，留给扩容兜底
            }
        }
        h1 ^ h
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::ZERO)
        .as_nanos() as u64
}
