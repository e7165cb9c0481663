//! # 오토인코더 인터프리터 핵심 모듈
//!
//! 디스크립터 파서, 레이어 명세, 인코더/디코더 그래프 빌더, 손실 빌더

pub mod descriptor;
pub mod errors;
pub mod graph;
pub mod losses;
pub mod model;
pub mod spec;
pub mod systems;

// 주요 타입들 재수출
pub use descriptor::*;
pub use errors::{BuildError, USAGE_EXAMPLE};
pub use graph::{build_decoder, build_encoder, BuildMode};
pub use losses::*;
pub use model::*;
pub use spec::*;
pub use systems::*;

// 각 모듈이 자체 테스트를 포함함
