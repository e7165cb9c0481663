//! # 디스크립터 모듈
//!
//! 텍스트 미니 언어 → 레이어 명세 시퀀스

pub mod parser;

pub use parser::{parse_descriptor, parse_layer_specs, parse_token};
