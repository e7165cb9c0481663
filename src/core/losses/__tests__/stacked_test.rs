use crate::core::losses::build_stacked_losses;
use crate::core::model::Autoencoder;
use crate::core::systems::{BuildConfig, GraphContext};
use anyhow::Result;
use candle_core::{Device, Tensor};

fn quiet_ctx() -> GraphContext {
    GraphContext::new(BuildConfig {
        training: false,
        verbose: false,
        ..BuildConfig::default()
    })
}

#[test]
fn 가중치_레이어마다_손실_하나() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 1, 8, 8), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "4c3r-p2-d0.5-8c3r-ap2-f12s")?;

    let losses = build_stacked_losses(&mut ctx, &mut model)?;
    assert_eq!(losses.len(), 3);
    assert_eq!(losses.len(), model.weight_layer_count());
    assert_eq!(model.stacked_losses.len(), 3);
    for loss in &losses {
        assert_eq!(loss.rank(), 0);
        let value = loss.to_scalar::<f32>()?;
        assert!(value.is_finite() && value >= 0.0, "손실 값: {}", value);
    }
    Ok(())
}

#[test]
fn 누적_손실은_새_가중치를_만들지_않음() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 3, 6, 6), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "5c3t-f7s")?;
    let vars = ctx.variable_count();
    // 인코더 2개 + 디코더 2개 스코프, 각각 weight/bias
    assert_eq!(vars, 8);

    build_stacked_losses(&mut ctx, &mut model)?;
    assert_eq!(ctx.variable_count(), vars);
    Ok(())
}

#[test]
fn 첫_패스_메타데이터는_유지() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 6), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "f4r-f3r")?;
    let before: Vec<_> = model
        .config
        .iter()
        .map(|s| s.decoder_output.as_ref().map(|t| t.id()))
        .collect();

    build_stacked_losses(&mut ctx, &mut model)?;

    let after: Vec<_> = model
        .config
        .iter()
        .map(|s| s.decoder_output.as_ref().map(|t| t.id()))
        .collect();
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn 누적_손실_그래디언트는_앞_레이어로_흐르지_않음() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (4, 6), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "f5r-f3r")?;
    let losses = build_stacked_losses(&mut ctx, &mut model)?;

    let first_scope = model.config[1].encoder_scope.clone().expect("스코프 누락");
    let second_scope = model.config[2].encoder_scope.clone().expect("스코프 누락");
    let second_decoder = model.config[2].decoder_scope.clone().expect("스코프 누락");

    // 두 번째 레이어의 누적 손실
    let grads = losses[1].backward()?;
    for var in ctx.scope_variables(&first_scope)? {
        assert!(grads.get(&var).is_none(), "앞 레이어 가중치로 그래디언트가 흘렀음");
    }
    for scope in [&second_scope, &second_decoder] {
        for var in ctx.scope_variables(scope)? {
            assert!(grads.get(&var).is_some(), "{} 가중치 그래디언트 누락", scope);
        }
    }

    // 전체 재구성 손실은 첫 레이어까지 흐른다 (대조군)
    let full = crate::core::losses::l2_loss(&input, &model.decoded, 1.0)?;
    let full_grads = full.backward()?;
    for var in ctx.scope_variables(&first_scope)? {
        assert!(full_grads.get(&var).is_some());
    }
    Ok(())
}

#[test]
fn 빌드되지_않은_명세는_실패() -> Result<()> {
    let mut ctx = quiet_ctx();
    let input = Tensor::randn(0f32, 1.0, (2, 6), &Device::Cpu)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "f4r")?;
    model.config[1].forward_input = None;

    assert!(build_stacked_losses(&mut ctx, &mut model).is_err());
    Ok(())
}
