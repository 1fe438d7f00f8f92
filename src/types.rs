//! 核心类型定义 - 槽位中存储的键值组合

use core::fmt;

/// 键值组合条目 - 键和值连续存放在同一段字节里
///
/// 前 `bytes_per_key` 字节是键，其余是值（允许为空）。
/// 空槽位由 `Option<Entry>` 的 `None` 表示，值为空的条目与空槽位是两回事。
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    data: Box<[u8]>,
}

impl Entry {
    /// 由键和值拼接创建新条目
    pub fn new(key: &[u8], value: &[u8]) -> Self {
        let mut data = Vec::with_capacity(key.len() + value.len());
        data.extend_from_slice(key);
        data.extend_from_slice(value);
        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// 条目总字节长度
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 键部分
    pub fn key(&self, bytes_per_key: usize) -> &[u8] {
        &self.data[..bytes_per_key]
    }

    /// 值部分
    pub fn value(&self, bytes_per_key: usize) -> &[u8] {
        &self.data[bytes_per_key..]
    }

    /// 值字节长度
    pub fn value_len(&self, bytes_per_key: usize) -> usize {
        self.data.len() - bytes_per_key
    }

    /// 拆成键值两段
    pub fn split(&self, bytes_per_key: usize) -> (&[u8], &[u8]) {
        self.data.split_at(bytes_per_key)
    }

    /// 消耗条目，取出值部分
    pub fn into_value(self, bytes_per_key: usize) -> Vec<u8> {
        let mut v = self.data.into_vec();
        v.drain(..bytes_per_key);
        v
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry(")?;
        for byte in self.data.iter() {
            write!(f, "{:02X}", byte)?;
        }
        write!(f, ")")
    }
}
