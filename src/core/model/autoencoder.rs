//! # 오토인코더 모델
//!
//! 디스크립터 → 레이어 명세 → 인코더 → 디코더 → 마스크 수집 → 손실 조립

use crate::core::descriptor::parse_layer_specs;
use crate::core::errors::BuildError;
use crate::core::graph::{build_decoder, build_encoder, BuildMode};
use crate::core::losses::{build_losses, build_stacked_losses};
use crate::core::spec::{format_descriptor, LayerKind, LayerSpec};
use crate::core::systems::GraphContext;
use anyhow::{bail, Result};
use candle_core::Tensor;

/// 빌드 결과 묶음. 레이어 명세 시퀀스(`config`)의 유일한 소유자
#[derive(Debug, Clone)]
pub struct Autoencoder {
    /// 인코더 출력
    pub encoded: Tensor,
    /// 디코더 출력 (입력과 같은 형상)
    pub decoded: Tensor,
    /// 전역 손실
    pub losses: Vec<Tensor>,
    /// 입력 명세를 포함한 전체 레이어 명세
    pub config: Vec<LayerSpec>,
    /// 순방향 순서로 수집된 argmax 마스크
    pub masks: Vec<Tensor>,
    /// 레이어별 누적 손실 (`build_stacked_losses` 호출 후 채워짐)
    pub stacked_losses: Vec<Tensor>,
}

impl Autoencoder {
    /// 디스크립터 문자열로부터 새 모델을 만든다
    pub fn from_descriptor(ctx: &mut GraphContext, input: &Tensor, descriptor: &str) -> Result<Self> {
        let specs = parse_layer_specs(input, descriptor)?;
        Self::build(ctx, input, specs, BuildMode::Fresh)
    }

    /// 이미 파싱된 명세 시퀀스로 빌드한다. 재빌드는 `BuildMode::Reuse` 로 호출
    pub fn build(
        ctx: &mut GraphContext,
        input: &Tensor,
        mut specs: Vec<LayerSpec>,
        mode: BuildMode,
    ) -> Result<Self> {
        if !specs.first().map_or(false, LayerSpec::is_input) {
            bail!(BuildError::MissingInputSpec);
        }
        if mode == BuildMode::Fresh && ctx.config.verbose {
            log::info!("Model config: {}", format_descriptor(&specs));
        }

        let encoded = build_encoder(ctx, input, &mut specs[1..], 1, mode)?;
        let decoded = build_decoder(ctx, &encoded, &mut specs, 0, mode, None)?;
        let masks = collect_argmax_masks(&mut specs);
        let losses = build_losses(&specs);

        Ok(Self {
            encoded,
            decoded,
            losses,
            config: specs,
            masks,
            stacked_losses: Vec::new(),
        })
    }

    /// 같은 가중치에 묶인 채로 새 입력에 대해 다시 빌드
    pub fn rebuild(&self, ctx: &mut GraphContext, input: &Tensor) -> Result<Self> {
        let mut specs = self.config.clone();
        if let Some(first) = specs.first_mut() {
            *first = LayerSpec::input(input);
        }
        Self::build(ctx, input, specs, BuildMode::Reuse)
    }

    /// 레이어별 누적 손실을 계산해 저장
    pub fn build_stacked_losses(&mut self, ctx: &mut GraphContext) -> Result<&[Tensor]> {
        build_stacked_losses(ctx, self)?;
        Ok(&self.stacked_losses)
    }

    pub fn descriptor(&self) -> String {
        format_descriptor(&self.config)
    }

    /// 가중치 레이어 수 (= 누적 손실 개수)
    pub fn weight_layer_count(&self) -> usize {
        self.config.iter().filter(|spec| spec.kind.is_weight_bearing()).count()
    }
}

/// argmax 마스크를 명세에서 꺼내 순방향 순서로 반환한다. 이후 명세에는 마스크가 남지 않는다
pub fn collect_argmax_masks(specs: &mut [LayerSpec]) -> Vec<Tensor> {
    specs
        .iter_mut()
        .filter(|spec| matches!(spec.kind, LayerKind::MaxPoolWithArgmax { .. }))
        .filter_map(|spec| spec.argmax_mask.take())
        .collect()
}
