//! 오토인코더 디스크립터 인터프리터
//!
//! `f10i-3c64r-d0.1-p2-ap2` 같은 짧은 디스크립터를 대칭 인코더/디코더 계산 그래프로 컴파일한다.
//! 텐서 연산과 가중치 저장은 candle 이 담당하고, 가중치 공유는 `VarMap` 스코프 이름으로 이뤄진다.
//!
//! ```no_run
//! use ae_interpreter::{Autoencoder, BuildConfig, GraphContext};
//! use candle_core::{DType, Device, Tensor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut ctx = GraphContext::new(BuildConfig::default());
//! let input = Tensor::zeros((4, 1, 28, 28), DType::F32, &Device::Cpu)?;
//! let mut model = Autoencoder::from_descriptor(&mut ctx, &input, "16c3r-ap2-8c3r-p2-f32s")?;
//! let stacked = model.build_stacked_losses(&mut ctx)?;
//! assert_eq!(stacked.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod core;

// 핵심 모듈들 재수출
pub use core::{
    // 파서 및 명세
    parse_descriptor, parse_layer_specs, parse_token, format_descriptor,
    Activation, LayerKind, LayerSpec,
    // 그래프 빌드
    build_encoder, build_decoder, BuildMode, GraphContext, BuildConfig, Precision,
    // 모델 및 손실
    Autoencoder, collect_argmax_masks, build_losses, build_stacked_losses, l2_loss,
    BuildError, USAGE_EXAMPLE,
};
