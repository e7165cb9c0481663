//! # 레이어 명세 모듈
//!
//! 고정된 레이어 어휘와 빌드 메타데이터

pub mod activation;
pub mod layer_spec;

pub use activation::Activation;
pub use layer_spec::{format_descriptor, LayerKind, LayerSpec};
