use crate::core::descriptor::parse_layer_specs;
use crate::core::errors::BuildError;
use crate::core::graph::BuildMode;
use crate::core::model::{collect_argmax_masks, Autoencoder};
use crate::core::spec::LayerKind;
use crate::core::systems::{BuildConfig, GraphContext};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};

fn quiet_ctx() -> GraphContext {
    GraphContext::new(BuildConfig {
        training: false,
        verbose: false,
        ..BuildConfig::default()
    })
}

#[test]
fn 디스크립터로_모델_빌드() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 1, 8, 8), &Device::Cpu)?;
    let model = Autoencoder::from_descriptor(&mut ctx, &input, "3c64r-p2")?;

    assert_eq!(model.encoded.dims(), &[2, 3, 4, 4]);
    assert_eq!(model.decoded.dims(), input.dims());
    assert_eq!(model.config.len(), 3);
    assert!(model.config[0].is_input());
    assert!(model.losses.is_empty());
    assert!(model.masks.is_empty());
    assert!(model.stacked_losses.is_empty());
    assert_eq!(model.descriptor(), "3c64r-p2");
    Ok(())
}

#[test]
fn argmax_마스크_수집() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (1, 2, 8, 8), &Device::Cpu)?;
    let model = Autoencoder::from_descriptor(&mut ctx, &input, "4c3r-ap2-p2-ap2")?;

    assert_eq!(model.masks.len(), 2);
    assert_eq!(model.masks[0].dims(), &[1, 4, 4, 4]);
    assert_eq!(model.masks[1].dims(), &[1, 4, 1, 1]);
    // 수집 이후 명세에는 마스크가 남지 않음
    assert!(model.config.iter().all(|spec| spec.argmax_mask.is_none()));
    Ok(())
}

#[test]
fn 마스크_수집은_순방향_순서() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (1, 1, 8, 8), &Device::Cpu)?;
    let mut specs = parse_layer_specs(&input, "ap2-ap2")?;
    crate::core::graph::build_encoder(&mut ctx, &input, &mut specs[1..], 1, BuildMode::Fresh)?;

    let masks = collect_argmax_masks(&mut specs);
    assert_eq!(masks.len(), 2);
    assert_eq!(masks[0].dims(), &[1, 1, 4, 4]);
    assert_eq!(masks[1].dims(), &[1, 1, 2, 2]);
    assert!(collect_argmax_masks(&mut specs).is_empty());
    Ok(())
}

#[test]
fn 재빌드는_같은_가중치를_공유() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 1, 8, 8), &Device::Cpu)?;
    let model = Autoencoder::from_descriptor(&mut ctx, &input, "4c3r-ap2-f10s")?;
    let vars = ctx.variable_count();

    let same = model.rebuild(&mut ctx, &input)?;
    assert_eq!(ctx.variable_count(), vars);
    for (a, b) in model.config.iter().zip(&same.config) {
        assert_eq!(a.encoder_scope, b.encoder_scope);
        assert_eq!(a.decoder_scope, b.decoder_scope);
        assert_eq!(a.shape, b.shape);
    }
    let diff = (&model.decoded - &same.decoded)?.abs()?.max_all()?.to_scalar::<f32>()?;
    assert!(diff < 1e-6, "같은 입력, 같은 가중치인데 출력이 다름: {}", diff);
    assert_eq!(same.masks.len(), 1);
    Ok(())
}

#[test]
fn 재빌드는_배치_크기를_바꿀_수_있음() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 1, 8, 8), &Device::Cpu)?;
    let model = Autoencoder::from_descriptor(&mut ctx, &input, "4c3r-p2-f6s")?;

    let batch = Tensor::randn(0f32, 1.0, (5, 1, 8, 8), &Device::Cpu)?;
    let rebuilt = model.rebuild(&mut ctx, &batch)?;
    assert_eq!(rebuilt.encoded.dims(), &[5, 6]);
    assert_eq!(rebuilt.decoded.dims(), &[5, 1, 8, 8]);
    assert_eq!(rebuilt.config[0].shape, vec![5, 1, 8, 8]);
    // 원래 모델은 그대로
    assert_eq!(model.config[0].shape, vec![2, 1, 8, 8]);
    Ok(())
}

#[test]
fn 입력_명세가_없으면_실패() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::zeros((1, 4), DType::F32, &Device::Cpu)?;
    let specs = parse_layer_specs(&input, "f2s")?;
    let without_input = specs[1..].to_vec();

    let err = Autoencoder::build(&mut ctx, &input, without_input, BuildMode::Fresh).unwrap_err();
    assert_eq!(err.downcast_ref::<BuildError>(), Some(&BuildError::MissingInputSpec));
    assert_eq!(ctx.variable_count(), 0);
    Ok(())
}

#[test]
fn 잘못된_디스크립터는_모델을_만들지_않음() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::zeros((1, 4), DType::F32, &Device::Cpu)?;

    let err = Autoencoder::from_descriptor(&mut ctx, &input, "xyz123").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MalformedDescriptor { .. })
    ));
    assert_eq!(ctx.variable_count(), 0);
    Ok(())
}

#[test]
fn 가중치_레이어_개수() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (1, 1, 8, 8), &Device::Cpu)?;
    let model = Autoencoder::from_descriptor(&mut ctx, &input, "4c3r-d0.5-p2-8c3s2t-f5r-0.1l")?;

    assert_eq!(model.weight_layer_count(), 3);
    assert!(matches!(model.config.last().map(|s| s.kind), Some(LayerKind::Loss { .. })));
    assert_eq!(model.descriptor(), "4c3r-d0.5-p2-8c3s2t-f5r-0.1l");
    Ok(())
}

#[test]
fn 모델_메서드로_누적_손실_빌드() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (3, 8), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "f6s-f4s-f2s")?;

    let count = model.build_stacked_losses(&mut ctx)?.len();
    assert_eq!(count, 3);
    assert_eq!(model.stacked_losses.len(), 3);
    Ok(())
}
