//! # 누적(stacked) 손실 빌더
//!
//! 가중치 레이어마다 그 레이어 하나만으로 인코딩→디코딩 왕복을 만들고
//! 재구성 손실을 계산한다. 입력은 `detach` 되어 앞쪽 레이어로 그래디언트가 흐르지 않는다.

use super::assembler::l2_loss;
use crate::core::graph::{build_decoder, build_encoder, BuildMode};
use crate::core::model::Autoencoder;
use crate::core::systems::GraphContext;
use anyhow::{anyhow, Context, Result};
use candle_core::Tensor;

/// 레이어별 누적 손실을 만들어 `model.stacked_losses` 에 저장한다.
///
/// 각 레이어는 작업용 복사본 위에서 재사용 모드로 다시 빌드되므로
/// 모델의 첫 패스 메타데이터는 바뀌지 않고, 새 가중치도 생기지 않는다.
pub fn build_stacked_losses(ctx: &mut GraphContext, model: &mut Autoencoder) -> Result<Vec<Tensor>> {
    let mut losses = Vec::new();
    for (index, spec) in model.config.iter().enumerate() {
        if !spec.kind.is_weight_bearing() {
            continue;
        }
        let forward_input = spec
            .forward_input
            .as_ref()
            .ok_or_else(|| anyhow!("layer {} has no forward input; build the model first", index))?;
        let input = forward_input.detach();

        let mut layer = [spec.clone()];
        let encoded = build_encoder(ctx, &input, &mut layer, index, BuildMode::Reuse)?;
        let decoded = build_decoder(ctx, &encoded, &mut layer, index, BuildMode::Reuse, None)?;
        let loss = l2_loss(&input, &decoded, 1.0)
            .with_context(|| format!("stacked_loss_{} 계산 실패", index))?;

        log::debug!("stacked_loss_{}\t{}\t{:?}", index, spec.kind, input.dims());
        losses.push(loss);
    }
    model.stacked_losses = losses.clone();
    Ok(losses)
}
