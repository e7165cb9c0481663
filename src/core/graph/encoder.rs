//! # 인코더 빌더
//!
//! 레이어 명세를 순서대로 훑으며 순방향 계산을 만들고, 각 명세에
//! 입력 형상 / 순방향 입력 / 인코더 스코프를 기록한다.

use super::spatial::{max_pool_with_argmax, pad_same};
use super::{bind_scope, expect_rank, BuildMode};
use crate::core::errors::BuildError;
use crate::core::spec::{LayerKind, LayerSpec};
use crate::core::systems::GraphContext;
use anyhow::{bail, Context, Result};
use candle_core::{Module, Tensor};
use candle_nn::{Conv2dConfig, ModuleT};

/// `specs` 를 순서대로 인코딩하고 마지막 텐서를 반환한다.
///
/// `first_index` 는 `specs[0]` 의 전체 시퀀스 내 위치 (로그와 오류 보고용).
/// 전체 모델에서는 `Input` 을 제외한 `specs[1..]` 이 넘어온다.
pub fn build_encoder(
    ctx: &mut GraphContext,
    input: &Tensor,
    specs: &mut [LayerSpec],
    first_index: usize,
    mode: BuildMode,
) -> Result<Tensor> {
    let mut net = input.clone();
    for (offset, spec) in specs.iter_mut().enumerate() {
        let index = first_index + offset;
        net = encode_layer(ctx, &net, spec, index, mode)
            .with_context(|| format!("encoder_{} ({}) 빌드 실패", index, spec.kind))?;
    }
    Ok(net)
}

fn encode_layer(
    ctx: &mut GraphContext,
    net: &Tensor,
    spec: &mut LayerSpec,
    index: usize,
    mode: BuildMode,
) -> Result<Tensor> {
    if spec.is_input() {
        bail!(BuildError::InputReentry { index });
    }

    spec.shape = net.dims().to_vec();
    spec.forward_input = Some(net.clone());

    let scope = bind_scope(
        ctx,
        spec.encoder_scope.as_deref(),
        &spec.kind,
        spec.kind.encoder_scope_base(),
        index,
        mode,
    )?;

    let output = match spec.kind {
        LayerKind::FullyConnected { size, activation } => {
            let flat = if net.rank() > 2 { net.flatten_from(1)? } else { net.clone() };
            let in_dim = flat.dim(1)?;
            let linear = candle_nn::linear(in_dim, size, ctx.var_builder(&scope))?;
            activation.apply(&linear.forward(&flat)?)?
        }
        LayerKind::Convolutional { filters, kernel, stride, activation } => {
            expect_rank(net, 4, index, &spec.kind)?;
            let in_channels = net.dim(1)?;
            let config = Conv2dConfig {
                padding: 0,
                stride,
                ..Default::default()
            };
            let conv = candle_nn::conv2d(in_channels, filters, kernel, config, ctx.var_builder(&scope))?;
            activation.apply(&conv.forward(&pad_same(net, kernel, stride)?)?)?
        }
        LayerKind::MaxPoolWithArgmax { kernel } => {
            check_pool_window(net, kernel, index, &spec.kind)?;
            let (pooled, mask) = max_pool_with_argmax(net, kernel)?;
            spec.argmax_mask = Some(mask);
            pooled
        }
        LayerKind::MaxPool { kernel } => {
            check_pool_window(net, kernel, index, &spec.kind)?;
            net.max_pool2d(kernel)?
        }
        LayerKind::Dropout { keep_prob } => {
            candle_nn::Dropout::new(1.0 - keep_prob).forward_t(net, ctx.config.training)?
        }
        LayerKind::Loss { .. } => net.clone(),
        LayerKind::Input => bail!(BuildError::InputReentry { index }),
    };

    if mode == BuildMode::Fresh {
        if ctx.config.verbose {
            log::info!("encoder_{}\t{:?}\t{}", index, output.dims(), scope);
        }
        spec.encoder_scope = Some(scope);
    }
    Ok(output)
}

fn check_pool_window(net: &Tensor, kernel: usize, index: usize, kind: &LayerKind) -> Result<()> {
    expect_rank(net, 4, index, kind)?;
    let (_, _, height, width) = net.dims4()?;
    if kernel > height || kernel > width {
        bail!(BuildError::KernelTooLarge {
            index,
            kernel,
            height,
            width,
        });
    }
    Ok(())
}
