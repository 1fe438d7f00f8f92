//! Cuckoo哈希集合 - 以空值约定复用哈希表核心

use std::fmt;

use crate::error::CuckooError;
use crate::hash::Hasher64;
use crate::map::{CuckooMap, CuckooMapConfig};
use crate::stats::MapStats;

/// Cuckoo哈希集合 - 存储定宽字节键的精确集合
///
/// 每个键以空值写入底层哈希表，其余操作全部委托。
pub struct CuckooSet {
    map: CuckooMap,
}

impl CuckooSet {
    /// 创建新集合，种子取自时钟
    pub fn new(
        config: CuckooMapConfig,
        hasher1: Box<dyn Hasher64>,
        hasher2: Box<dyn Hasher64>,
    ) -> Result<Self, CuckooError> {
        Ok(Self {
            map: CuckooMap::new(config, hasher1, hasher2)?,
        })
    }

    /// 以指定种子创建，行为可复现
    pub fn with_seed(
        config: CuckooMapConfig,
        hasher1: Box<dyn Hasher64>,
        hasher2: Box<dyn Hasher64>,
        seed1: u64,
    ) -> Result<Self, CuckooError> {
        Ok(Self {
            map: CuckooMap::with_seed(config, hasher1, hasher2, seed1)?,
        })
    }

    /// 使用默认哈希函数组合创建
    pub fn with_default_hashers(config: CuckooMapConfig) -> Result<Self, CuckooError> {
        Ok(Self {
            map: CuckooMap::with_default_hashers(config)?,
        })
    }

    /// 加入键，返回是否为新插入
    pub fn put(&mut self, key: &[u8]) -> Result<bool, CuckooError> {
        Ok(self.map.put_if_absent(key, &[])?.is_none())
    }

    /// 删除键；键不存在时返回 `Ok(false)`
    pub fn del(&mut self, key: &[u8]) -> Result<bool, CuckooError> {
        match self.map.del(key) {
            Ok(_) => Ok(true),
            Err(CuckooError::KeyNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn count(&self) -> u64 {
        self.map.count()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn load_factor(&self) -> f64 {
        self.map.load_factor()
    }

    pub fn memory_in_bytes(&self) -> u64 {
        self.map.memory_in_bytes()
    }

    pub fn expansion_count(&self) -> u32 {
        self.map.expansion_count()
    }

    /// 运行状态快照
    pub fn stats(&self) -> MapStats {
        self.map.stats()
    }

    /// 只读遍历全部键，回调返回false时提前终止
    pub fn for_each_key<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[u8]) -> bool,
    {
        self.map.for_each(|k, _| f(k))
    }

    /// 键迭代器，顺序无语义
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.map.iter().map(|(k, _)| k)
    }
}

impl Default for CuckooSet {
    fn default() -> Self {
        Self {
            map: CuckooMap::default(),
        }
    }
}

impl fmt::Display for CuckooSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.map.to_string().replacen("CuckooMap", "CuckooSet", 1))
    }
}
