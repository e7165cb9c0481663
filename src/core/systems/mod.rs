//! # 시스템 모듈
//!
//! 빌드 설정과 가중치 스코프 컨텍스트

pub mod config;
pub mod context;

pub use config::{BuildConfig, Precision};
pub use context::{GraphContext, ScopeNamer};

// 테스트 모듈들
#[cfg(test)]
pub mod __tests__;
