//! App - アプリケーション層
//!
//! ports を組み合わせて 1 回のサイクルを実装します。
//!
//! # 主要コンポーネント
//! - **select_due**: 評価日の due set を取得（読み取りのみ）
//! - **advance_due_set**: due set 全体を 1 トランザクションで進行
//! - **CycleCoordinator**: Selecting → Advancing → Dispatching の状態機械
//! - **CycleCoordinatorBuilder**: 起動時検証つきのワイヤリング
//! - **CycleReport**: サイクル結果の報告

pub mod advancer;
pub mod builder;
pub mod coordinator;
pub mod selector;
pub mod status;

pub use self::advancer::advance_due_set;
pub use self::builder::{BuildError, CycleCoordinatorBuilder};
pub use self::coordinator::{CycleCoordinator, CycleOptions};
pub use self::selector::select_due;
pub use self::status::{CycleReport, DispatchOutcome};
