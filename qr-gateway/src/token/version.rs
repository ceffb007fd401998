//! QR 版本注册表
//!
//! 使用 DashMap 实现无锁并发的版本号管理。
//! 每家餐厅维护独立的 QR 版本号，支持原子递增。
//!
//! # 使用场景
//!
//! 桌台码被重印或疑似泄露时，员工触发 `rotate` 递增版本号，
//! 所有携带旧版本号的已印刷 QR 令牌在兑换时失效。

use dashmap::DashMap;

/// 初始版本号 (第一批印刷的桌台码)
const INITIAL_VERSION: u64 = 1;

/// QR 版本注册表
#[derive(Debug, Default)]
pub struct QrVersionRegistry {
    versions: DashMap<String, u64>,
}

impl QrVersionRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 获取餐厅当前的 QR 版本号
    ///
    /// 未注册过的餐厅返回初始版本 1
    pub fn current(&self, restaurant_id: &str) -> u64 {
        self.versions
            .get(restaurant_id)
            .map(|v| *v)
            .unwrap_or(INITIAL_VERSION)
    }

    /// 轮换版本号并返回新值
    ///
    /// 旧版本的已印刷 QR 码自此作废
    pub fn rotate(&self, restaurant_id: &str) -> u64 {
        let mut entry = self
            .versions
            .entry(restaurant_id.to_string())
            .or_insert(INITIAL_VERSION);
        *entry += 1;
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_restaurant_starts_at_one() {
        let registry = QrVersionRegistry::new();
        assert_eq!(registry.current("rest_1"), 1);
    }

    #[test]
    fn test_rotate_increments() {
        let registry = QrVersionRegistry::new();
        assert_eq!(registry.rotate("rest_1"), 2);
        assert_eq!(registry.rotate("rest_1"), 3);
        assert_eq!(registry.current("rest_1"), 3);
        // 其他餐厅不受影响
        assert_eq!(registry.current("rest_2"), 1);
    }
}
