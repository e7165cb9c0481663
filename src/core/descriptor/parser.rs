//! # 디스크립터 파서
//!
//! `f10i-3c64r-d0.1-p2-ap2` 같은 하이픈 구분 문자열을 레이어 종류 목록으로 변환한다.
//!
//! | 토큰 | 레이어 |
//! |------|--------|
//! | `<int>c<int>[s<int>][r\|s\|i\|t]` | 컨볼루션 (필터 수, 커널, 스트라이드, 활성화) |
//! | `f<int>[r\|s\|i\|t]` | 완전연결 (출력 크기, 활성화) |
//! | `d<float>` | 드롭아웃 (keep 확률) |
//! | `p<int>` | 맥스 풀링 |
//! | `ap<int>` | argmax 맥스 풀링 |
//! | `<float>l` | 손실 (alpha) |

use crate::core::errors::BuildError;
use crate::core::spec::{Activation, LayerKind, LayerSpec};
use anyhow::{bail, Result};
use candle_core::Tensor;
use once_cell::sync::Lazy;
use regex::Regex;

static CONV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)c(\d+)(?:s(\d+))?([rsit])?$").expect("conv pattern"));
static FC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^f(\d+)([rsit])?$").expect("fc pattern"));
static DROPOUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^d(\d+(?:\.\d*)?|\.\d+)$").expect("dropout pattern"));
static POOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^p(\d+)$").expect("pool pattern"));
static ARGMAX_POOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ap(\d+)$").expect("argmax pool pattern"));
static LOSS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)l$").expect("loss pattern"));

/// 활성화 글자를 생략했을 때의 기본값
const DEFAULT_FC_ACTIVATION: Activation = Activation::Sigmoid;
const DEFAULT_CONV_ACTIVATION: Activation = Activation::Relu;

/// 디스크립터 전체를 파싱한다. 하나라도 잘못된 토큰이 있으면 전체가 실패한다.
pub fn parse_descriptor(descriptor: &str) -> Result<Vec<LayerKind>> {
    let normalized = descriptor.trim().replace('_', "-");
    if normalized.is_empty() {
        bail!(BuildError::EmptyDescriptor);
    }
    normalized.split('-').map(parse_token).collect()
}

/// 입력 명세를 앞에 붙인 전체 레이어 시퀀스
pub fn parse_layer_specs(input: &Tensor, descriptor: &str) -> Result<Vec<LayerSpec>> {
    let kinds = parse_descriptor(descriptor)?;
    let mut specs = Vec::with_capacity(kinds.len() + 1);
    specs.push(LayerSpec::input(input));
    specs.extend(kinds.into_iter().map(LayerSpec::new));
    Ok(specs)
}

/// 토큰 하나를 파싱
pub fn parse_token(token: &str) -> Result<LayerKind> {
    if let Some(caps) = CONV_RE.captures(token) {
        let filters = positive(token, "filters", &caps[1])?;
        let kernel = positive(token, "kernel", &caps[2])?;
        let stride = match caps.get(3) {
            Some(m) => positive(token, "stride", m.as_str())?,
            None => 1,
        };
        return Ok(LayerKind::Convolutional {
            filters,
            kernel,
            stride,
            activation: activation_or(caps.get(4).map(|m| m.as_str()), DEFAULT_CONV_ACTIVATION),
        });
    }

    if let Some(caps) = FC_RE.captures(token) {
        return Ok(LayerKind::FullyConnected {
            size: positive(token, "size", &caps[1])?,
            activation: activation_or(caps.get(2).map(|m| m.as_str()), DEFAULT_FC_ACTIVATION),
        });
    }

    if let Some(caps) = DROPOUT_RE.captures(token) {
        let keep_prob = float(token, &caps[1])?;
        if !(keep_prob > 0.0 && keep_prob <= 1.0) {
            bail!(invalid(token, format!("keep probability {} is outside (0, 1]", keep_prob)));
        }
        return Ok(LayerKind::Dropout { keep_prob });
    }

    if let Some(caps) = ARGMAX_POOL_RE.captures(token) {
        return Ok(LayerKind::MaxPoolWithArgmax {
            kernel: positive(token, "kernel", &caps[1])?,
        });
    }

    if let Some(caps) = POOL_RE.captures(token) {
        return Ok(LayerKind::MaxPool {
            kernel: positive(token, "kernel", &caps[1])?,
        });
    }

    if let Some(caps) = LOSS_RE.captures(token) {
        return Ok(LayerKind::Loss {
            alpha: float(token, &caps[1])?,
        });
    }

    bail!(BuildError::MalformedDescriptor {
        token: token.to_string(),
    })
}

// 정규식이 글자를 [rsit] 로 제한하므로 여기서는 항상 매핑된다
fn activation_or(letter: Option<&str>, default: Activation) -> Activation {
    letter
        .and_then(|s| s.chars().next())
        .and_then(Activation::from_letter)
        .unwrap_or(default)
}

fn positive(token: &str, field: &str, digits: &str) -> Result<usize> {
    let value: usize = digits
        .parse()
        .map_err(|_| invalid(token, format!("{} '{}' is not a valid integer", field, digits)))?;
    if value == 0 {
        bail!(invalid(token, format!("{} must be positive", field)));
    }
    Ok(value)
}

fn float(token: &str, text: &str) -> Result<f32> {
    let value: f32 = text
        .parse()
        .map_err(|_| invalid(token, format!("'{}' is not a valid number", text)))?;
    if !value.is_finite() {
        bail!(invalid(token, format!("'{}' is not finite", text)));
    }
    Ok(value)
}

fn invalid(token: &str, reason: String) -> BuildError {
    BuildError::InvalidParameter {
        token: token.to_string(),
        reason,
    }
}
