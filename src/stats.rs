//! 运行统计 - 状态快照与字节数格式化

use std::fmt;

/// 哈希表状态快照（非实时，取样瞬间一致）
#[derive(Debug, Default, Clone)]
pub struct MapStats {
    pub count: u64,
    pub capacity: u64,
    pub bucket_count: u32,
    pub load_factor: f64,
    pub values_byte_count: u64,
    pub memory_in_bytes: u64,
    pub expansion_count: u32,
    pub zero_hash2_count: u64,
}

impl fmt::Display for MapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} capacity={} buckets={} load_factor={:.2} memory={} expansions={} zero_hash2={}",
            self.count,
            self.capacity,
            self.bucket_count,
            self.load_factor,
            format_bytes(self.memory_in_bytes),
            self.expansion_count,
            self.zero_hash2_count,
        )
    }
}

const KILOBYTE: u64 = 1 << 10;
const MEGABYTE: u64 = 1 << 20;
const GIGABYTE: u64 = 1 << 30;
const TERABYTE: u64 = 1 << 40;

/// 字节数的人类可读格式：B/K/M/G/T，保留一位小数，末尾的 .0 去掉
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let (value, unit) = if bytes >= TERABYTE {
        (bytes as f64 / TERABYTE as f64, "T")
    } else if bytes >= GIGABYTE {
        (bytes as f64 / GIGABYTE as f64, "G")
    } else if bytes >= MEGABYTE {
        (bytes as f64 / MEGABYTE as f64, "M")
    } else if bytes >= KILOBYTE {
        (bytes as f64 / KILOBYTE as f64, "K")
    } else {
        (bytes as f64, "B")
    };

    let mut s = format!("{:.1}", value);
    if s.ends_with(".0") {
        s.truncate(s.len() - 2);
    }
    s + unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1), "1B");
        assert_eq!(format_bytes(1023), "1023B");
        assert_eq!(format_bytes(1024), "1K");
        assert_eq!(format_bytes(1536), "1.5K");
        assert_eq!(format_bytes(1 << 20), "1M");
        assert_eq!(format_bytes(2_621_440), "2.5M");
        assert_eq!(format_bytes(1 << 30), "1G");
        assert_eq!(format_bytes(1 << 40), "1T");
    }

    #[test]
    fn test_stats_display() {
        let stats = MapStats {
            count: 3,
            capacity: 8,
            bucket_count: 2,
            load_factor: 0.375,
            values_byte_count: 12,
            memory_in_bytes: 23,
            expansion_count: 1,
            zero_hash2_count: 0,
        };
        let text = stats.to_string();
        assert!(text.contains("count=3"), "{}", text);
        assert!(text.contains("memory=23B"), "{}", text);
    }
}
