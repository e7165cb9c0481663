//! 활성화 함수 태그
//!
//! 디스크립터의 한 글자 표기(`r`, `s`, `t`, `i`)와 candle 연산 사이의 전사 매핑.

use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Sigmoid,
    Relu,
    Tanh,
    Identity,
}

impl Activation {
    /// 디스크립터 글자 → 활성화. 알 수 없는 글자는 `None`
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'r' => Some(Self::Relu),
            's' => Some(Self::Sigmoid),
            't' => Some(Self::Tanh),
            'i' => Some(Self::Identity),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Relu => 'r',
            Self::Sigmoid => 's',
            Self::Tanh => 't',
            Self::Identity => 'i',
        }
    }

    pub fn apply(self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
            Self::Relu => xs.relu(),
            Self::Tanh => xs.tanh(),
            Self::Identity => Ok(xs.clone()),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sigmoid => "sigmoid",
            Self::Relu => "relu",
            Self::Tanh => "tanh",
            Self::Identity => "identity",
        };
        f.write_str(name)
    }
}
