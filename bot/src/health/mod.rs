//! ヘルスチェック
//!
//! 監視対象URLへの到達性を1回だけ確認し、結果を分類する。
//! リトライは行わない（実行間隔は呼び出し側の責務）。

pub mod prober;

pub use prober::HealthProber;
