//! # 디코더 빌더
//!
//! 같은 레이어 시퀀스를 역순으로 훑으며 인코더의 거울상 계산을 만든다.
//! 인코더가 기록한 형상, 스코프, argmax 마스크를 그대로 사용한다.

use super::spatial::{fit_spatial, same_padding, unpool_with_argmax, upsample_copy};
use super::{bind_scope, expect_rank, BuildMode};
use crate::core::errors::BuildError;
use crate::core::spec::layer_spec::flat_size;
use crate::core::spec::{LayerKind, LayerSpec};
use crate::core::systems::GraphContext;
use anyhow::{bail, Context, Result};
use candle_core::{Module, Tensor};
use candle_nn::ConvTranspose2dConfig;

/// `specs` 를 마지막 원소부터 거꾸로 디코딩한다.
///
/// `Input` 명세를 만나거나 시퀀스 앞을 지나치면 종료한다.
/// `masks` 는 인코딩 없이 단독으로 디코더를 만들 때 쓰는 마스크 스택이며,
/// `MaxPoolWithArgmax` 명세에 자체 마스크가 없을 때 하나씩 pop 된다.
pub fn build_decoder(
    ctx: &mut GraphContext,
    encoded: &Tensor,
    specs: &mut [LayerSpec],
    first_index: usize,
    mode: BuildMode,
    mut masks: Option<&mut Vec<Tensor>>,
) -> Result<Tensor> {
    let mut net = encoded.clone();
    for position in (0..specs.len()).rev() {
        // 앞선 flatten 으로 사라진 공간 구조를 다음 레이어의 입력 형상으로 복원
        if let Some(next) = specs.get(position + 1) {
            net = restore_rank(&net, &next.shape)?;
        }
        if specs[position].is_input() {
            return Ok(net);
        }

        let index = first_index + position;
        let spec = &mut specs[position];
        net = decode_layer(ctx, &net, spec, index, mode, masks.as_deref_mut())
            .with_context(|| format!("decoder_{} ({}) 빌드 실패", index, spec.kind))?;
    }

    match specs.first() {
        Some(first) => restore_rank(&net, &first.shape),
        None => Ok(net),
    }
}

/// 배치 축은 현재 텐서의 것을 쓴다. 재사용 빌드는 배치 크기가 달라질 수 있다
fn restore_rank(net: &Tensor, shape: &[usize]) -> Result<Tensor> {
    if shape.is_empty() || shape.len() == net.rank() {
        return Ok(net.clone());
    }
    let mut target = shape.to_vec();
    target[0] = net.dim(0)?;
    Ok(net.reshape(target)?)
}

fn decode_layer(
    ctx: &mut GraphContext,
    net: &Tensor,
    spec: &mut LayerSpec,
    index: usize,
    mode: BuildMode,
    masks: Option<&mut Vec<Tensor>>,
) -> Result<Tensor> {
    let scope = bind_scope(
        ctx,
        spec.decoder_scope.as_deref(),
        &spec.kind,
        spec.kind.decoder_scope_base(),
        index,
        mode,
    )?;

    let output = match spec.kind {
        LayerKind::FullyConnected { activation, .. } => {
            let flat = if net.rank() > 2 { net.flatten_from(1)? } else { net.clone() };
            let linear = candle_nn::linear(flat.dim(1)?, flat_size(&spec.shape), ctx.var_builder(&scope))?;
            activation.apply(&linear.forward(&flat)?)?
        }
        LayerKind::Convolutional { kernel, stride, activation, .. } => {
            expect_rank(net, 4, index, &spec.kind)?;
            let (_, _, height, width) = spatial_dims(&spec.shape, index, &spec.kind)?;
            let in_channels = net.dim(1)?;
            let config = ConvTranspose2dConfig {
                padding: 0,
                output_padding: 0,
                stride,
                dilation: 1,
            };
            let deconv = candle_nn::conv_transpose2d(
                in_channels,
                spec.shape[1],
                kernel,
                config,
                ctx.var_builder(&scope),
            )?;
            // 순방향 SAME 패딩만큼 앞쪽을 잘라내 원래 공간 크기로 맞춘다
            let offset = (
                same_padding(height, kernel, stride).0,
                same_padding(width, kernel, stride).0,
            );
            let full = deconv.forward(net)?;
            activation.apply(&fit_spatial(&full, offset, height, width)?)?
        }
        LayerKind::MaxPoolWithArgmax { kernel } => {
            expect_rank(net, 4, index, &spec.kind)?;
            let (_, _, height, width) = spatial_dims(&spec.shape, index, &spec.kind)?;
            let mask = match (&spec.argmax_mask, masks) {
                (Some(mask), _) => Some(mask.clone()),
                (None, Some(stack)) => Some(stack.pop().ok_or(BuildError::MaskExhausted { index })?),
                (None, None) => None,
            };
            match mask {
                Some(mask) => unpool_with_argmax(net, &mask, kernel, height, width)?,
                None => upsample_copy(net, kernel, height, width)?,
            }
        }
        LayerKind::MaxPool { kernel } => {
            expect_rank(net, 4, index, &spec.kind)?;
            let (_, _, height, width) = spatial_dims(&spec.shape, index, &spec.kind)?;
            upsample_copy(net, kernel, height, width)?
        }
        LayerKind::Dropout { .. } => net.clone(),
        LayerKind::Loss { .. } => net.clone(),
        LayerKind::Input => bail!(BuildError::InputReentry { index }),
    };

    if mode == BuildMode::Fresh {
        if ctx.config.verbose {
            log::info!("decoder_{}\t{:?}\t{}", index, output.dims(), scope);
        }
        spec.decoder_scope = Some(scope);
    }
    spec.decoder_output = Some(output.clone());
    Ok(output)
}

/// 인코딩 시 기록된 4 차원 형상
fn spatial_dims(shape: &[usize], index: usize, kind: &LayerKind) -> Result<(usize, usize, usize, usize)> {
    match shape {
        [n, c, h, w] => Ok((*n, *c, *h, *w)),
        _ => bail!(BuildError::RankMismatch {
            index,
            layer: kind.to_string(),
            expected: 4,
            found: shape.len(),
        }),
    }
}
