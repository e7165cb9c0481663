//! # 빌드 구성 설정
//!
//! 그래프 빌드 동작을 바꾸는 설정들. JSON 파일에서 읽을 수 있다.

use anyhow::{Context, Result};
use candle_core::DType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 텐서/가중치 정밀도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    F32,
    F64,
}

impl Precision {
    pub fn dtype(self) -> DType {
        match self {
            Self::F32 => DType::F32,
            Self::F64 => DType::F64,
        }
    }
}

/// 빌드 구성
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// 드롭아웃 적용 여부 (false 면 드롭아웃은 항등 연산)
    pub training: bool,
    /// 최초 빌드 시 레이어별 진단 로그 출력
    pub verbose: bool,
    /// 가중치 정밀도 (입력 텐서도 같은 정밀도여야 함)
    pub precision: Precision,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            training: true,
            verbose: true,
            precision: Precision::F32,
        }
    }
}

impl BuildConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("빌드 설정 JSON 파싱 실패")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("설정 파일을 읽을 수 없음: {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn dtype(&self) -> DType {
        self.precision.dtype()
    }
}
