//! # 그래프 빌더 테스트


use crate::core::descriptor::parse_layer_specs;
use crate::core::spec::LayerSpec;
use crate::core::systems::{BuildConfig, GraphContext};
use candle_core::Tensor;

/// 드롭아웃이 꺼져 있고 로그가 없는 결정적 컨텍스트
pub(crate) fn deterministic_ctx() -> GraphContext {
    GraphContext::new(BuildConfig {
        training: false,
        verbose: false,
        ..BuildConfig::default()
    })
}

pub(crate) fn specs_for(input: &Tensor, descriptor: &str) -> Vec<LayerSpec> {
    parse_layer_specs(input, descriptor).expect("테스트 디스크립터 파싱 실패")
}
