//! 모델 전체 손실 조립
//!
//! `Loss` 명세의 alpha 는 파싱되지만 아직 연산자에 연결되지 않는다.
//! 전역 손실은 항상 비어 있고, 실제로 계산되는 손실은 레이어별 누적 손실뿐이다.

use crate::core::spec::LayerSpec;
use candle_core::{Result, Tensor};

/// 전역 손실 목록. 실패하지 않으며 기본값은 빈 목록
pub fn build_losses(_specs: &[LayerSpec]) -> Vec<Tensor> {
    Vec::new()
}

/// `alpha * sum((a - b)^2) / 2`
pub fn l2_loss(lhs: &Tensor, rhs: &Tensor, alpha: f64) -> Result<Tensor> {
    (lhs - rhs)?.sqr()?.sum_all()?.affine(alpha * 0.5, 0.0)
}
