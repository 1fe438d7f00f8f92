//! 桶存储 - 槽位二维数组与占用/字节计数

use crate::types::Entry;

/// 桶数组 - 逻辑上 `bucket[b][s]` 的二维槽位，实际为连续一维存储
///
/// 所有槽位状态转移都经由本结构完成：槽位转为占用时加计值字节，
/// 转为空时减计，`count` 与 `values_byte_count` 任何时刻都与实际内容一致。
/// 桶内槽位顺序没有语义，但在两次修改之间保持稳定。
pub struct BucketArray {
    slots: Vec<Option<Entry>>,
    bucket_count: u32,
    keys_per_bucket: u32,
    bytes_per_key: u32,
    count: u64,
    values_byte_count: u64,
}

impl BucketArray {
    /// 分配全空的桶数组
    pub fn allocate(bucket_count: u32, keys_per_bucket: u32, bytes_per_key: u32) -> Self {
        let total = bucket_count as usize * keys_per_bucket as usize;
        let mut slots = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        Self {
            slots,
            bucket_count,
            keys_per_bucket,
            bytes_per_key,
            count: 0,
            values_byte_count: 0,
        }
    }

    fn slot_index(&self, bucket: u32, slot: u32) -> usize {
        debug_assert!(bucket < self.bucket_count, "桶索引越界");
        debug_assert!(slot < self.keys_per_bucket, "槽位索引越界");
        bucket as usize * self.keys_per_bucket as usize + slot as usize
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    pub fn keys_per_bucket(&self) -> u32 {
        self.keys_per_bucket
    }

    pub fn bytes_per_key(&self) -> u32 {
        self.bytes_per_key
    }

    /// 占用槽位数
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 所有占用条目的值字节总和
    pub fn values_byte_count(&self) -> u64 {
        self.values_byte_count
    }

    /// 槽位总容量
    pub fn capacity(&self) -> u64 {
        u64::from(self.bucket_count) * u64::from(self.keys_per_bucket)
    }

    /// 读槽位
    pub fn get(&self, bucket: u32, slot: u32) -> Option<&Entry> {
        self.slots[self.slot_index(bucket, slot)].as_ref()
    }

    /// 写入空槽位，槽位转为占用
    pub fn set(&mut self, bucket: u32, slot: u32, entry: Entry) {
        let idx = self.slot_index(bucket, slot);
        debug_assert!(self.slots[idx].is_none(), "写入的槽位必须为空");
        self.count += 1;
        self.values_byte_count += entry.value_len(self.bytes_per_key as usize) as u64;
        self.slots[idx] = Some(entry);
    }

    /// 取出槽位内容，槽位转为空
    pub fn take(&mut self, bucket: u32, slot: u32) -> Option<Entry> {
        let idx = self.slot_index(bucket, slot);
        let entry = self.slots[idx].take();
        if let Some(e) = &entry {
            self.count -= 1;
            self.values_byte_count -= e.value_len(self.bytes_per_key as usize) as u64;
        }
        entry
    }

    /// 交换占用槽位的内容，返回被置换的旧条目
    ///
    /// 占用数不变，字节计数按新旧值长度之差修正。
    pub fn swap(&mut self, bucket: u32, slot: u32, entry: Entry) -> Entry {
        let idx = self.slot_index(bucket, slot);
        let bpk = self.bytes_per_key as usize;
        self.values_byte_count += entry.value_len(bpk) as u64;
        let old = self.slots[idx]
            .replace(entry)
            .expect("交换的槽位必须已占用");
        self.values_byte_count -= old.value_len(bpk) as u64;
        old
    }

    /// 桶内第一个空槽位
    pub fn first_empty_slot(&self, bucket: u32) -> Option<u32> {
        (0..self.keys_per_bucket).find(|&s| self.get(bucket, s).is_none())
    }

    /// 桶内按键逐字节比较查找
    pub fn find_key(&self, bucket: u32, key: &[u8]) -> Option<u32> {
        let bpk = self.bytes_per_key as usize;
        (0..self.keys_per_bucket).find(|&s| self.get(bucket, s).map_or(false, |e| e.key(bpk) == key))
    }

    /// 只读遍历所有占用槽位的键值对，回调返回false时提前终止
    ///
    /// 返回是否完整遍历了全部条目。
    pub fn for_each<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        let bpk = self.bytes_per_key as usize;
        for entry in self.slots.iter().flatten() {
            let (k, v) = entry.split(bpk);
            if !f(k, v) {
                return false;
            }
        }
        true
    }

    /// 占用槽位的键值对迭代器
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        let bpk = self.bytes_per_key as usize;
        self.slots.iter().flatten().map(move |e| e.split(bpk))
    }

    /// 消耗自身，产出 (桶号, 槽位号, 条目)，供扩容搬迁使用
    pub fn into_entries(self) -> impl Iterator<Item = (u32, u32, Entry)> {
        let keys_per_bucket = self.keys_per_bucket as usize;
        self.slots
            .into_iter()
            .enumerate()
            .filter_map(move |(idx, slot)| {
                slot.map(|entry| {
                    let b = (idx / keys_per_bucket) as u32;
                    let s = (idx % keys_per_bucket) as u32;
                    (b, s, entry)
                })
            })
    }

    /// 清空全部槽位并归零计数
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.count = 0;
        self.values_byte_count = 0;
    }
}
