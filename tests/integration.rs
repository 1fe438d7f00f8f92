//! Cuckoo哈希表集成测试

use std::collections::HashMap;

use cuckoo_bytemap::{
    default_hasher_pair, log_info, CuckooError, CuckooMap, CuckooMapConfig, CuckooSet,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_log::test;

const SEED: u64 = 42;
const KEY_SIZE: usize = 16;

fn config(
    bytes_per_key: u32,
    keys_per_bucket: u32,
    bucket_count: u32,
    expandable: bool,
) -> CuckooMapConfig {
    CuckooMapConfig {
        bytes_per_key,
        keys_per_bucket,
        bucket_count,
        expandable,
    }
}

fn new_map(
    bytes_per_key: u32,
    keys_per_bucket: u32,
    bucket_count: u32,
    expandable: bool,
) -> CuckooMap {
    let (h1, h2) = default_hasher_pair();
    CuckooMap::with_seed(
        config(bytes_per_key, keys_per_bucket, bucket_count, expandable),
        h1,
        h2,
        SEED,
    )
    .expect("测试配置合法")
}

/// 生成互不相同的随机键
fn generate_keys(count: usize, size: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..count)
        .map(|_| {
            let mut key = vec![0u8; size];
            rng.fill(&mut key[..]);
            key
        })
        .collect()
}

#[test]
fn test_single_byte_keys_roundtrip() {
    // 单槽单桶起步，靠扩容容纳全部256个单字节键
    let mut map = new_map(1, 1, 1, true);

    for i in 0..=255u8 {
        let k = [i];
        assert_eq!(map.put_if_absent(&k, &k).unwrap(), None, "键 {} 首次插入", i);
        assert_eq!(map.get(&k), Some(&k[..]));
        assert!(map.contains_key(&k));
        assert!(map.contains_value(&k));
    }
    assert_eq!(map.count(), 256);
    assert!(map.expansion_count() >= 1);
    log_info!("插入完成: {}", map);

    // 重复插入返回既有值且计数不变
    for i in 0..=255u8 {
        let k = [i];
        assert_eq!(map.put_if_absent(&k, &[0]).unwrap(), Some(vec![i]));
    }
    assert_eq!(map.count(), 256);

    for i in 0..=255u8 {
        let k = [i];
        assert_eq!(map.del(&k).unwrap(), vec![i]);
    }
    assert!(map.is_empty());

    for i in 0..=255u8 {
        let k = [i];
        assert!(matches!(
            map.del(&k).unwrap_err(),
            CuckooError::KeyNotFound { .. }
        ));
        assert_eq!(map.get(&k), None);
        assert!(!map.contains_key(&k));
    }
}

#[test]
fn test_random_keys_empty_values() {
    let mut map = new_map(KEY_SIZE as u32, 4, 64, true);
    let n = 5000;
    let keys = generate_keys(n, KEY_SIZE);

    for key in &keys {
        assert_eq!(map.put_if_absent(key, &[]).unwrap(), None);
        assert!(map.contains_key(key));
    }
    assert_eq!(map.count(), n as u64);
    assert_eq!(map.values_byte_count(), 0, "空值不占字节计数");
    log_info!("随机键插入完成: {}", map.stats());

    // 未插入过的键不应命中
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..n {
        let mut probe = vec![0u8; KEY_SIZE];
        rng.fill(&mut probe[..]);
        assert!(!map.contains_key(&probe));
    }

    // 删除奇数下标的一半
    for (i, key) in keys.iter().enumerate() {
        if i % 2 == 1 {
            assert_eq!(map.del(key).unwrap(), Vec::<u8>::new());
        }
    }
    assert_eq!(map.count(), (n / 2) as u64);

    for (i, key) in keys.iter().enumerate() {
        if i % 2 == 1 {
            assert!(!map.contains_key(key), "已删除的键不应存在");
        } else {
            assert!(map.contains_key(key), "保留的键应仍然存在");
        }
    }
}

#[test]
fn test_expansion_preserves_content() {
    let mut map = new_map(2, 2, 2, true);
    let mut expected: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();

    for i in 0..2000u32 {
        let key = vec![(i >> 8) as u8, (i & 0xff) as u8];
        let value = vec![(i % 251) as u8];
        map.put(&key, &value).unwrap();
        expected.push((key, value));
    }
    assert!(map.expansion_count() >= 1, "容量4起步必然扩容多次");
    assert_eq!(map.count(), 2000);

    // 扩容前后键值多重集合一致
    let mut dumped: Vec<(Vec<u8>, Vec<u8>)> = map
        .iter()
        .map(|(k, v)| (k.to_vec(), v.to_vec()))
        .collect();
    dumped.sort();
    expected.sort();
    assert_eq!(dumped, expected);
}

#[test]
fn test_clear_reinsert_cycles() {
    let mut map = new_map(2, 2, 2, true);
    let mut stable_buckets = 0;

    for round in 0..5 {
        for i in 0..300u32 {
            let key = [(i >> 8) as u8, (i & 0xff) as u8];
            map.put(&key, &[round]).unwrap();
        }
        assert_eq!(map.count(), 300, "第{}轮插入后计数", round);

        if round == 0 {
            stable_buckets = map.bucket_count();
        } else {
            assert!(map.bucket_count() >= stable_buckets, "清空不会缩小桶数");
        }

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.values_byte_count(), 0);
    }
}

#[test]
fn test_nonexpandable_saturated_state() {
    let mut map = new_map(1, 2, 1, false);

    map.put(&[0], b"a").unwrap();
    map.put(&[1], b"bb").unwrap();
    let err = map.put(&[2], b"ccc").unwrap_err();
    assert!(matches!(err, CuckooError::BucketFull { .. }));
    assert!(err.to_string().contains("桶已满"));

    // 失败后的可见状态与失败前一致
    assert_eq!(map.count(), 2);
    assert_eq!(map.values_byte_count(), 3);
    assert_eq!(map.get(&[0]), Some(&b"a"[..]));
    assert_eq!(map.get(&[1]), Some(&b"bb"[..]));
    assert!(!map.contains_key(&[2]));
}

#[test]
fn test_model_random_ops() {
    let mut map = new_map(8, 4, 8, true);
    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(SEED);

    // 键池有限，保证插入/删除/覆盖互相碰撞
    let keys = generate_keys(512, 8);

    for step in 0..4000 {
        let key = &keys[rng.gen_range(0..keys.len())];
        match rng.gen_range(0..10) {
            0..=3 => {
                let mut value = vec![0u8; rng.gen_range(0..32)];
                rng.fill(&mut value[..]);
                let prev = map.put(key, &value).expect("插入失败");
                assert_eq!(prev, model.insert(key.clone(), value), "第{}步 put 旧值不一致", step);
            }
            4..=5 => {
                let mut value = vec![0u8; rng.gen_range(0..32)];
                rng.fill(&mut value[..]);
                let existing = map.put_if_absent(key, &value).expect("插入失败");
                match model.get(key) {
                    Some(v) => assert_eq!(existing.as_deref(), Some(v.as_slice())),
                    None => {
                        assert!(existing.is_none());
                        model.insert(key.clone(), value);
                    }
                }
            }
            6..=7 => match map.del(key) {
                Ok(v) => assert_eq!(Some(v), model.remove(key), "第{}步 del 返回值不一致", step),
                Err(CuckooError::KeyNotFound { .. }) => {
                    assert!(!model.contains_key(key));
                }
                Err(e) => panic!("意外错误: {}", e),
            },
            _ => {
                assert_eq!(map.get(key), model.get(key).map(|v| v.as_slice()));
            }
        }
        assert_eq!(map.count(), model.len() as u64);
    }

    // 最终全量对账
    let byte_total: u64 = model.values().map(|v| v.len() as u64).sum();
    assert_eq!(map.values_byte_count(), byte_total);

    let mut dumped: Vec<(Vec<u8>, Vec<u8>)> = map
        .iter()
        .map(|(k, v)| (k.to_vec(), v.to_vec()))
        .collect();
    dumped.sort();
    let mut expected: Vec<(Vec<u8>, Vec<u8>)> = model.into_iter().collect();
    expected.sort();
    assert_eq!(dumped, expected);
}

#[test]
fn test_set_facade_bulk() {
    let (h1, h2) = default_hasher_pair();
    let mut set = CuckooSet::with_seed(config(KEY_SIZE as u32, 16, 8, true), h1, h2, SEED)
        .expect("测试配置合法");
    let keys = generate_keys(2000, KEY_SIZE);

    for key in &keys {
        assert!(set.put(key).unwrap(), "首次加入应为新插入");
    }
    assert_eq!(set.count(), 2000);
    for key in &keys {
        assert!(set.contains(key));
        assert!(!set.put(key).unwrap(), "重复加入应返回false");
    }
    assert_eq!(set.count(), 2000);

    for key in &keys {
        assert!(set.del(key).unwrap());
    }
    assert!(set.is_empty());
    for key in &keys {
        assert!(!set.del(key).unwrap(), "再次删除应返回false");
    }
}
