//! # 공간 연산 헬퍼
//!
//! NCHW 텐서에 대한 SAME 패딩, argmax 풀링/언풀링, 복사 업샘플링.
//! candle 에는 argmax 풀링과 비대칭 패딩이 없어서 기본 텐서 연산으로 조합한다.

use candle_core::{Result, Tensor};

/// TF 방식 SAME 패딩: (앞, 뒤) 패딩 크기
pub fn same_padding(size: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let out = (size + stride - 1) / stride;
    let total = ((out.saturating_sub(1)) * stride + kernel).saturating_sub(size);
    let before = total / 2;
    (before, total - before)
}

/// 높이/너비 축에 SAME 패딩을 0 으로 채운다
pub fn pad_same(xs: &Tensor, kernel: usize, stride: usize) -> Result<Tensor> {
    let (_, _, h, w) = xs.dims4()?;
    let (top, bottom) = same_padding(h, kernel, stride);
    let (left, right) = same_padding(w, kernel, stride);
    let mut out = xs.clone();
    if top + bottom > 0 {
        out = out.pad_with_zeros(2, top, bottom)?;
    }
    if left + right > 0 {
        out = out.pad_with_zeros(3, left, right)?;
    }
    Ok(out)
}

/// `dim` 축을 `start` 부터 `len` 만큼 잘라내고, 모자라면 뒤쪽을 0 으로 채운다
fn crop_or_pad(xs: &Tensor, dim: usize, start: usize, len: usize) -> Result<Tensor> {
    let size = xs.dim(dim)?;
    if size >= start + len {
        return xs.narrow(dim, start, len);
    }
    let start = start.min(size);
    let available = size - start;
    let kept = xs.narrow(dim, start, available)?;
    kept.pad_with_zeros(dim, 0, len - available)
}

/// 공간 크기를 (height, width) 로 맞춘다. 오프셋은 앞쪽에서 버릴 크기
pub fn fit_spatial(
    xs: &Tensor,
    offset: (usize, usize),
    height: usize,
    width: usize,
) -> Result<Tensor> {
    let (_, _, h, w) = xs.dims4()?;
    let mut out = xs.clone();
    if h != height || offset.0 > 0 {
        out = crop_or_pad(&out, 2, offset.0, height)?;
    }
    if w != width || offset.1 > 0 {
        out = crop_or_pad(&out, 3, offset.1, width)?;
    }
    Ok(out)
}

/// 커널 크기 윈도우로 나눈 텐서: `[N, C, OH, OW, K*K]`
fn windows(xs: &Tensor, kernel: usize) -> Result<Tensor> {
    let (n, c, h, w) = xs.dims4()?;
    let (oh, ow) = (h / kernel, w / kernel);
    xs.narrow(2, 0, oh * kernel)?
        .narrow(3, 0, ow * kernel)?
        .reshape(vec![n, c, oh, kernel, ow, kernel])?
        .permute(vec![0, 1, 2, 4, 3, 5])?
        .reshape(vec![n, c, oh, ow, kernel * kernel])
}

/// 스트라이드 = 커널인 맥스 풀링과 윈도우 내 argmax 인덱스(u32) 마스크
pub fn max_pool_with_argmax(xs: &Tensor, kernel: usize) -> Result<(Tensor, Tensor)> {
    let windows = windows(xs, kernel)?;
    let pooled = windows.max(4)?;
    let mask = windows.argmax(4)?;
    Ok((pooled, mask))
}

/// argmax 마스크 위치에만 값을 되돌려 놓는 언풀링. 나머지 위치는 0
pub fn unpool_with_argmax(
    pooled: &Tensor,
    mask: &Tensor,
    kernel: usize,
    height: usize,
    width: usize,
) -> Result<Tensor> {
    let (n, c, oh, ow) = pooled.dims4()?;
    let window = kernel * kernel;
    let positions = Tensor::arange(0u32, window as u32, pooled.device())?;
    let one_hot = mask
        .unsqueeze(4)?
        .broadcast_eq(&positions)?
        .to_dtype(pooled.dtype())?;
    let scattered = one_hot.broadcast_mul(&pooled.unsqueeze(4)?)?;
    let blocks = scattered
        .reshape(vec![n, c, oh, ow, kernel, kernel])?
        .permute(vec![0, 1, 2, 4, 3, 5])?
        .reshape(vec![n, c, oh * kernel, ow * kernel])?;
    fit_spatial(&blocks, (0, 0), height, width)
}

/// 최근접 복사 업샘플링 후 원래 공간 크기로 맞춘다
pub fn upsample_copy(xs: &Tensor, kernel: usize, height: usize, width: usize) -> Result<Tensor> {
    let (_, _, h, w) = xs.dims4()?;
    let upsampled = xs.upsample_nearest2d(h * kernel, w * kernel)?;
    fit_spatial(&upsampled, (0, 0), height, width)
}
