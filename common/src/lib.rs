//! Downdetector Bot 共通ライブラリ
//!
//! プローブ結果の型定義、設定、エラー型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 共通型定義
pub mod types;
