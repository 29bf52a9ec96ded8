//! 按鍵鎖註冊表

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// 按鍵互斥鎖註冊表
///
/// 「讀最新結餘 → 計算 → 寫入」是典型的 read-modify-write 競態，
/// 同一鍵的操作必須序列化；不同鍵各自持有獨立的鎖，可完全並行。
pub struct KeyLockRegistry<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyLockRegistry<K> {
    /// 創建新的註冊表
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// 取得該鍵的互斥鎖（不存在則創建）
    ///
    /// 呼叫端持有回傳的 `Arc` 並自行 lock，離開臨界區時釋放。
    pub fn acquire(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 目前註冊的鍵數量
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 檢查是否尚無任何鍵
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone> Default for KeyLockRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
