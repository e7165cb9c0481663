//! # 그래프 빌드 컨텍스트
//!
//! 가중치 스코프 레지스트리(`VarMap`), 디바이스, 빌드 설정, 스코프 이름 생성기를 묶는다.
//! 스코프 이름 `s` 의 가중치는 `VarMap` 안에서 `s.weight`, `s.bias` 로 저장된다.

use super::config::BuildConfig;
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use std::collections::{HashMap, HashSet};

/// 새 빌드에서 쓸 고유한 스코프 이름을 만든다.
///
/// `fully_connected`, `fully_connected_1`, ... 처럼 접두어별 카운터를 쓰며,
/// 이미 발급했거나 `VarMap` 에 변수가 있는 이름은 건너뛴다.
#[derive(Debug, Default, Clone)]
pub struct ScopeNamer {
    counters: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl ScopeNamer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_candidate(&mut self, base: &str) -> String {
        let count = self.counters.entry(base.to_string()).or_insert(0);
        let name = if *count == 0 {
            base.to_string()
        } else {
            format!("{}_{}", base, count)
        };
        *count += 1;
        name
    }

    pub fn is_issued(&self, name: &str) -> bool {
        self.issued.contains(name)
    }
}

pub struct GraphContext {
    pub varmap: VarMap,
    pub device: Device,
    pub config: BuildConfig,
    namer: ScopeNamer,
}

impl GraphContext {
    /// CPU 디바이스와 빈 `VarMap` 으로 생성
    pub fn new(config: BuildConfig) -> Self {
        Self::with_device(config, Device::Cpu)
    }

    pub fn with_device(config: BuildConfig, device: Device) -> Self {
        Self::with_varmap(config, device, VarMap::new())
    }

    /// 기존 가중치 레지스트리를 공유하는 컨텍스트
    pub fn with_varmap(config: BuildConfig, device: Device, varmap: VarMap) -> Self {
        Self {
            varmap,
            device,
            config,
            namer: ScopeNamer::new(),
        }
    }

    pub fn dtype(&self) -> DType {
        self.config.dtype()
    }

    /// 스코프가 지정된 `VarBuilder`
    pub fn var_builder(&self, scope: &str) -> VarBuilder<'_> {
        VarBuilder::from_varmap(&self.varmap, self.dtype(), &self.device).pp(scope)
    }

    /// 충돌하지 않는 새 스코프 이름 발급
    pub fn fresh_scope(&mut self, base: &str) -> Result<String> {
        loop {
            let candidate = self.namer.next_candidate(base);
            if self.namer.is_issued(&candidate) || self.has_scope(&candidate)? {
                continue;
            }
            self.namer.issued.insert(candidate.clone());
            return Ok(candidate);
        }
    }

    /// `VarMap` 에 해당 스코프의 변수가 하나라도 있는지
    pub fn has_scope(&self, scope: &str) -> Result<bool> {
        let prefix = format!("{}.", scope);
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("VarMap lock poisoned"))?;
        Ok(data.keys().any(|name| name.starts_with(&prefix)))
    }

    /// 스코프에 속한 변수 텐서들 (이름순)
    pub fn scope_variables(&self, scope: &str) -> Result<Vec<Tensor>> {
        let prefix = format!("{}.", scope);
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|_| anyhow!("VarMap lock poisoned"))?;
        let mut entries: Vec<_> = data
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, var)| (name.clone(), var.as_tensor().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().map(|(_, tensor)| tensor).collect())
    }

    pub fn variable_count(&self) -> usize {
        self.varmap.all_vars().len()
    }
}
