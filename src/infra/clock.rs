use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// 現在時刻の取得を抽象化するトレイト
///
/// タイムスタンプの付与はすべてこのトレイト経由で行い、
/// テスト時には固定時刻の実装をDIします。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// 複数のリポジトリやテストコードでクロックを共有するため
impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// システム時刻を返す本番用の実装
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// テスト用の固定時刻クロック
///
/// `advance`で任意に時刻を進められる。
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// 時刻を指定した分だけ進める
    pub fn advance(&self, by: Duration) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
