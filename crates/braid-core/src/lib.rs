//! braid-core
//!
//! Core building blocks for the braid concurrency demos.
//!
//! # モジュール構成
//! - **guard**: StateGuard — 1 つの可変カウンタへの排他アクセス
//! - **fetch**: Fetcher port とシミュレーション実装（SimulatedFetcher / FlakyFetcher）
//! - **join**: TaskJoiner — fan-out/fan-in（起動順で join する）
//! - **backref**: Owner/Dependent — 所有エッジ + 非所有の逆エッジ
//! - **ids**: FetchId（ULID ベースの操作タグ）
//! - **error**: エラー型（FetchError, JoinFailure）

pub mod backref;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod ids;
pub mod join;

pub use self::backref::{Dependent, Owner, attach, release};
pub use self::error::{FetchError, JoinFailure};
pub use self::fetch::{Fetcher, FlakyFetcher, SimulatedFetcher, VALID_URL};
pub use self::guard::StateGuard;
pub use self::ids::FetchId;
pub use self::join::{JoinCounts, JoinReport, OpOutcome, OperationRecord, TaskJoiner};
