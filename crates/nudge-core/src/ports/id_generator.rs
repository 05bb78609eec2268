//! IdGenerator port - サイクル ID 生成の抽象化
//!
//! 1 回の実行ごとに CycleId を振り、tracing の span に載せてログを相関させます。
//!
//! # 実装
//! - **UlidCycleIdGenerator**: ULID ベース（本番用）

use crate::domain::CycleId;
use crate::ports::Clock;
use ulid::Ulid;

pub trait CycleIdGenerator: Send + Sync {
    fn generate_cycle_id(&self) -> CycleId;
}

/// UlidCycleIdGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使って timestamp 部分を固定できます。
pub struct UlidCycleIdGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidCycleIdGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> CycleIdGenerator for UlidCycleIdGenerator<C> {
    fn generate_cycle_id(&self) -> CycleId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        CycleId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
