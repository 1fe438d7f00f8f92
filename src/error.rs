//! 统一错误处理 - 表可能返回的所有错误类型

/// Cuckoo哈希表可能发生的错误
#[derive(Debug, thiserror::Error)]
pub enum CuckooError {
    #[error("无效参数: {reason}")]
    InvalidArgument {
        reason: String,
    },

    #[error("桶已满，无法插入新条目 (容量: {capacity}, 当前大小: {count}, 负载因子: {load_factor:.2})")]
    BucketFull {
        capacity: u64,
        count: u64,
        load_factor: f64,
    },

    #[error("键不存在: {key}")]
    KeyNotFound {
        key: String,
    },
}

impl CuckooError {
    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { .. } => Some("检查构造参数与键长"),
            Self::BucketFull { .. } => Some("增大桶数或允许扩容"),
            Self::KeyNotFound { .. } => Some("确认键值是否存在"),
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidArgument { .. })
    }
}
