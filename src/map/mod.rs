//! 哈希表核心模块 - 桶存储与Cuckoo哈希表实现

pub mod bucket;
pub mod cuckoo_map;

pub use bucket::BucketArray;
pub use cuckoo_map::{CuckooMap, CuckooMapConfig};

use once_cell::sync::Lazy;

/// 默认键宽（字节）
pub const DEFAULT_BYTES_PER_KEY: u32 = 1;
/// 默认每桶槽位数
pub const DEFAULT_KEYS_PER_BUCKET: u32 = 8;
/// 默认初始桶数
pub const DEFAULT_BUCKET_COUNT: u32 = 1;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<CuckooMapConfig> = Lazy::new(CuckooMapConfig::default);
