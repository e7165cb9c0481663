//! # 시스템 모듈 테스트
//!
//! 빌드 설정과 스코프 컨텍스트 단위테스트
