//! 哈希函数契约 - 带种子的64位哈希及常用实现

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;

/// 哈希函数契约 - 纯确定性映射 `(字节, 种子) -> u64`
///
/// 构造表时注入两个实现；两者必须是不同的函数，且低32位投影应当
/// 足够独立，否则备桶与主桶频繁重合，踢出效率会明显退化。
/// 表只会以原始键字节调用哈希函数，不做任何变换。
pub trait Hasher64 {
    fn hash64_with_seed(&self, data: &[u8], seed: u64) -> u64;
}

// 闭包可以直接作为哈希函数注入，测试替身也走这条路
impl<F> Hasher64 for F
where
    F: Fn(&[u8], u64) -> u64,
{
    fn hash64_with_seed(&self, data: &[u8], seed: u64) -> u64 {
        self(data, seed)
    }
}

/// 哈希算法选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    AHash,
    XxHash,
    Default,
}

/// 构建指定算法的哈希函数
pub fn build_hasher(algorithm: HashAlgorithm) -> Box<dyn Hasher64> {
    match algorithm {
        HashAlgorithm::AHash => Box::new(|data: &[u8], seed: u64| {
            let state = RandomState::with_seed(seed as usize);
            let mut hasher = state.build_hasher();
            data.hash(&mut hasher);
            hasher.finish()
        }),
        HashAlgorithm::XxHash => {
            Box::new(|data: &[u8], seed: u64| twox_hash::xxh3::hash64_with_seed(data, seed))
        }
        HashAlgorithm::Default => Box::new(|data: &[u8], seed: u64| {
            let mut hasher = DefaultHasher::new();
            hasher.write_u64(seed);
            hasher.write(data);
            hasher.finish()
        }),
    }
}

/// 默认哈希函数组合：主哈希AHash，次哈希XxHash
pub fn default_hasher_pair() -> (Box<dyn Hasher64>, Box<dyn Hasher64>) {
    (
        build_hasher(HashAlgorithm::AHash),
        build_hasher(HashAlgorithm::XxHash),
    )
}
