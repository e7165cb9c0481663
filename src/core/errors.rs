//! # 빌드 오류 정의
//!
//! 모든 오류는 빌드 전체를 중단시킨다. 부분적으로 만들어진 모델은 반환되지 않는다.

use thiserror::Error;

/// 디스크립터 사용 예시 (오류 메시지에 함께 출력)
pub const USAGE_EXAMPLE: &str = "f10i-3c64r-d0.1-p2-ap2";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Malformed descriptor token '{token}' (example: {USAGE_EXAMPLE})")]
    MalformedDescriptor { token: String },
    #[error("Empty descriptor (example: {USAGE_EXAMPLE})")]
    EmptyDescriptor,
    #[error("Invalid parameter in token '{token}': {reason}")]
    InvalidParameter { token: String, reason: String },
    #[error("Layer sequence must start with an input spec")]
    MissingInputSpec,
    #[error("Input spec reached at index {index} while encoding")]
    InputReentry { index: usize },
    #[error("Reuse requested for layer {index} but it was never built")]
    ReuseWithoutPriorBuild { index: usize },
    #[error("Argmax mask stack exhausted at layer {index}")]
    MaskExhausted { index: usize },
    #[error("Layer {index} ({layer}) expects a rank {expected} tensor, got rank {found}")]
    RankMismatch {
        index: usize,
        layer: String,
        expected: usize,
        found: usize,
    },
    #[error("Layer {index}: pooling kernel {kernel} exceeds spatial size {height}x{width}")]
    KernelTooLarge {
        index: usize,
        kernel: usize,
        height: usize,
        width: usize,
    },
}
