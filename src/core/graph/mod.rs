//! # 그래프 빌더 모듈
//!
//! 인코더(순방향)와 디코더(역방향) 두 번의 반복 패스로 대칭 오토인코더를 만든다.

pub mod decoder;
pub mod encoder;
pub mod spatial;

pub use decoder::build_decoder;
pub use encoder::build_encoder;

use crate::core::errors::BuildError;
use crate::core::spec::LayerKind;
use crate::core::systems::GraphContext;
use anyhow::{bail, Result};
use candle_core::Tensor;

/// 빌드 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// 새 스코프 이름을 발급하고 가중치를 새로 만든다
    Fresh,
    /// 기록된 스코프 이름에 묶이며 가중치를 만들지 않는다
    Reuse,
}

/// 레이어의 스코프 이름을 정한다.
///
/// 재사용 모드에서 스코프가 기록되지 않았거나, 가중치 레이어인데 `VarMap` 에
/// 변수가 없다면 `ReuseWithoutPriorBuild` 로 실패한다.
pub(crate) fn bind_scope(
    ctx: &mut GraphContext,
    recorded: Option<&str>,
    kind: &LayerKind,
    base: &str,
    index: usize,
    mode: BuildMode,
) -> Result<String> {
    match mode {
        BuildMode::Fresh => ctx.fresh_scope(base),
        BuildMode::Reuse => {
            let Some(scope) = recorded else {
                bail!(BuildError::ReuseWithoutPriorBuild { index });
            };
            if kind.is_weight_bearing() && !ctx.has_scope(scope)? {
                bail!(BuildError::ReuseWithoutPriorBuild { index });
            }
            Ok(scope.to_string())
        }
    }
}

pub(crate) fn expect_rank(net: &Tensor, expected: usize, index: usize, kind: &LayerKind) -> Result<()> {
    if net.rank() != expected {
        bail!(BuildError::RankMismatch {
            index,
            layer: kind.to_string(),
            expected,
            found: net.rank(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod __tests__;
