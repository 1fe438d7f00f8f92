//! 定宽字节键的内存Cuckoo哈希表库
//!
//! 提供插入、查询、更新、删除、遍历，以及踢出停滞时桶数组的自动翻倍。
//! 同一核心以空值约定包装出精确哈希集合。
//!
//! ## 主要特性
//! - 桶式Cuckoo放置：两个候选桶 + 桶内线性踢出，单次插入代价有界
//! - 备桶索引由主桶号XOR按键推导项得到，两个索引互为反函数
//! - 扩容原位重排，槽位号保持不变，无需重新执行Cuckoo放置
//! - 精确的条目计数与值字节计量，调试构建下全程校验
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_bytemap::{CuckooMap, CuckooMapConfig};
//!
//! let config = CuckooMapConfig {
//!     bytes_per_key: 4,
//!     keys_per_bucket: 4,
//!     bucket_count: 8,
//!     expandable: true,
//! };
//! let mut map = CuckooMap::with_default_hashers(config).expect("配置合法");
//!
//! map.put(b"key1", b"value1").expect("插入失败");
//! assert_eq!(map.get(b"key1"), Some(&b"value1"[..]));
//!
//! map.del(b"key1").expect("删除失败");
//! assert!(map.is_empty());
//! ```

#![warn(clippy::all)]

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

// 核心模块导出
pub mod error;
pub mod hash;
pub mod map;
pub mod set;
pub mod stats;
pub mod types;

// 公共接口导出
pub use crate::{
    error::CuckooError,
    hash::{build_hasher, default_hasher_pair, simple_hash, DoubleHasher, HashAlgorithm, Hasher64},
    map::{
        BucketArray, CuckooMap, CuckooMapConfig, DEFAULT_BUCKET_COUNT, DEFAULT_BYTES_PER_KEY,
        DEFAULT_KEYS_PER_BUCKET,
    },
    set::CuckooSet,
    stats::{format_bytes, MapStats},
    types::Entry,
};

/// 批量插入，返回成功条数
pub fn batch_put<'a>(
    map: &mut CuckooMap,
    items: impl Iterator<Item = (&'a [u8], &'a [u8])>,
) -> usize {
    let mut count = 0;
    for (k, v) in items {
        if map.put(k, v).is_ok() {
            count += 1;
        }
    }
    count
}

/// 批量查询
pub fn batch_get<'a>(
    map: &'a CuckooMap,
    keys: impl Iterator<Item = &'a [u8]>,
) -> Vec<Option<&'a [u8]>> {
    keys.map(|k| map.get(k)).collect()
}

impl std::fmt::Debug for CuckooMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("CuckooMap")
            .field("count", &stats.count)
            .field("capacity", &stats.capacity)
            .field("load_factor", &stats.load_factor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_helpers() {
        let mut map = CuckooMap::with_default_hashers(CuckooMapConfig {
            bytes_per_key: 2,
            keys_per_bucket: 4,
            bucket_count: 4,
            expandable: true,
        })
        .unwrap();

        let items: Vec<(&[u8], &[u8])> = vec![(b"k1", b"v1"), (b"k2", b"v2"), (b"k3", b"v3")];
        assert_eq!(batch_put(&mut map, items.into_iter()), 3);
        assert_eq!(map.count(), 3);

        let keys: Vec<&[u8]> = vec![b"k1", b"k2", b"zz"];
        let values = batch_get(&map, keys.into_iter());
        assert_eq!(values, vec![Some(&b"v1"[..]), Some(&b"v2"[..]), None]);
    }

    #[test]
    fn test_debug_output() {
        let map = CuckooMap::default();
        let text = format!("{:?}", map);
        assert!(text.contains("CuckooMap"), "{}", text);
        assert!(text.contains("count"), "{}", text);
    }
}
