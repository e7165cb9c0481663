//! # 레이어 명세
//!
//! 디스크립터 토큰 하나당 `LayerSpec` 하나가 만들어지고, 맨 앞에는 입력 텐서로부터
//! 만든 `Input` 명세가 붙는다. 인코더/디코더 빌드 중에 형상, 스코프 이름,
//! 풀링 마스크 같은 메타데이터가 이 구조체에 기록된다.

use super::activation::Activation;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 레이어 종류. 각 케이스는 자신에게 필요한 파라미터만 가진다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Input,
    FullyConnected {
        size: usize,
        activation: Activation,
    },
    Convolutional {
        filters: usize,
        kernel: usize,
        stride: usize,
        activation: Activation,
    },
    MaxPool {
        kernel: usize,
    },
    MaxPoolWithArgmax {
        kernel: usize,
    },
    Dropout {
        keep_prob: f32,
    },
    Loss {
        alpha: f32,
    },
}

impl LayerKind {
    /// 학습 가능한 가중치를 가진 레이어인지 (FC, Conv)
    pub fn is_weight_bearing(&self) -> bool {
        matches!(self, Self::FullyConnected { .. } | Self::Convolutional { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::FullyConnected { .. } => "fully_connected",
            Self::Convolutional { .. } => "convolutional",
            Self::MaxPool { .. } => "max_pooling",
            Self::MaxPoolWithArgmax { .. } => "maxpool_with_args",
            Self::Dropout { .. } => "dropout",
            Self::Loss { .. } => "loss",
        }
    }

    /// 인코더 쪽 스코프 이름의 접두어
    pub(crate) fn encoder_scope_base(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::FullyConnected { .. } => "fully_connected",
            Self::Convolutional { .. } => "conv2d",
            Self::MaxPool { .. } => "max_pool",
            Self::MaxPoolWithArgmax { .. } => "max_pool_with_argmax",
            Self::Dropout { .. } => "dropout",
            Self::Loss { .. } => "loss",
        }
    }

    /// 디코더 쪽 스코프 이름의 접두어
    pub(crate) fn decoder_scope_base(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::FullyConnected { .. } => "fully_connected",
            Self::Convolutional { .. } => "conv2d_transpose",
            Self::MaxPool { .. } => "upsample",
            Self::MaxPoolWithArgmax { .. } => "unpool",
            Self::Dropout { .. } => "identity",
            Self::Loss { .. } => "loss",
        }
    }
}

/// 정규화된 디스크립터 토큰으로 출력 (파싱하면 같은 종류가 나온다)
impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::FullyConnected { size, activation } => {
                write!(f, "f{}{}", size, activation.letter())
            }
            Self::Convolutional { filters, kernel, stride, activation } => {
                write!(f, "{}c{}", filters, kernel)?;
                if *stride != 1 {
                    write!(f, "s{}", stride)?;
                }
                write!(f, "{}", activation.letter())
            }
            Self::MaxPool { kernel } => write!(f, "p{}", kernel),
            Self::MaxPoolWithArgmax { kernel } => write!(f, "ap{}", kernel),
            Self::Dropout { keep_prob } => write!(f, "d{}", keep_prob),
            Self::Loss { alpha } => write!(f, "{}l", alpha),
        }
    }
}

/// 레이어 명세 + 빌드 중 기록되는 메타데이터
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub kind: LayerKind,
    /// 이 레이어로 들어온 텐서의 형상 (인코딩 시 기록)
    pub shape: Vec<usize>,
    /// 인코더 가중치 스코프 (최초 빌드에서 한 번 기록, 재사용 빌드에서는 읽기 전용)
    pub encoder_scope: Option<String>,
    /// 디코더 가중치 스코프
    pub decoder_scope: Option<String>,
    /// 순방향 패스에서 이 레이어로 들어온 텐서
    pub forward_input: Option<Tensor>,
    /// 디코더에서 이 레이어를 거울상으로 통과한 결과
    pub decoder_output: Option<Tensor>,
    /// `MaxPoolWithArgmax` 전용 윈도우 내 argmax 인덱스
    pub argmax_mask: Option<Tensor>,
}

impl LayerSpec {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            shape: Vec::new(),
            encoder_scope: None,
            decoder_scope: None,
            forward_input: None,
            decoder_output: None,
            argmax_mask: None,
        }
    }

    /// 입력 텐서로부터 맨 앞의 `Input` 명세를 만든다
    pub fn input(input: &Tensor) -> Self {
        Self {
            shape: input.dims().to_vec(),
            decoder_output: Some(input.clone()),
            ..Self::new(LayerKind::Input)
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, LayerKind::Input)
    }
}

/// 입력 명세를 제외한 레이어들을 다시 디스크립터 문자열로 직렬화
pub fn format_descriptor(specs: &[LayerSpec]) -> String {
    specs
        .iter()
        .filter(|spec| !spec.is_input())
        .map(|spec| spec.kind.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// 형상에서 배치 축을 뺀 원소 수
pub(crate) fn flat_size(shape: &[usize]) -> usize {
    shape.iter().skip(1).product()
}
