//! Layer kernels with explicit backward passes
//!
//! Convolutions use im2col followed by a matrix product. All layers take
//! `[batch, channels, height, width]` tensors; stride 1 and no padding for
//! convolutions.

use ndarray::{s, Array1, Array2, Array3, Array4, ArrayView1, ArrayView2, ArrayView3, ArrayView4, Axis, Zip};

use crate::{Error, Result};

/// Gradients of a convolution
#[derive(Debug, Clone)]
pub struct ConvGrads {
    /// Gradient w.r.t. the input, when requested
    pub input: Option<Array4<f32>>,
    pub weight: Array4<f32>,
    pub bias: Array1<f32>,
}

/// Gradients of a fully connected layer
#[derive(Debug, Clone)]
pub struct LinearGrads {
    pub input: Array2<f32>,
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

/// Unfold `image` (`[c, h, w]`) into columns of `k x k` patches
///
/// Row `ci * k * k + ky * k + kx`, column `oy * ow + ox`.
fn im2col(image: ArrayView3<f32>, k: usize) -> Array2<f32> {
    let (c, h, w) = image.dim();
    let (oh, ow) = (h - k + 1, w - k + 1);
    Array2::from_shape_fn((c * k * k, oh * ow), |(row, col)| {
        let (ci, ky, kx) = (row / (k * k), (row / k) % k, row % k);
        let (oy, ox) = (col / ow, col % ow);
        image[[ci, oy + ky, ox + kx]]
    })
}

/// Fold columns back into a `[c, h, w]` image, summing overlaps
fn col2im(cols: &Array2<f32>, (c, h, w): (usize, usize, usize), k: usize) -> Array3<f32> {
    let ow = w - k + 1;
    let mut image = Array3::zeros((c, h, w));
    for ((row, col), &v) in cols.indexed_iter() {
        let (ci, ky, kx) = (row / (k * k), (row / k) % k, row % k);
        let (oy, ox) = (col / ow, col % ow);
        image[[ci, oy + ky, ox + kx]] += v;
    }
    image
}

fn check_conv(input: &ArrayView4<f32>, weight: &ArrayView4<f32>, bias: &ArrayView1<f32>) -> Result<()> {
    let (_, c, h, w) = input.dim();
    let (out_c, in_c, kh, kw) = weight.dim();
    if kh != kw {
        return Err(Error::shape_mismatch("conv kernel", [kh, kh], [kh, kw]));
    }
    if c != in_c {
        return Err(Error::shape_mismatch("conv input channels", [in_c], [c]));
    }
    if h < kh || w < kw {
        return Err(Error::shape_mismatch("conv input size", [kh, kw], [h, w]));
    }
    if bias.len() != out_c {
        return Err(Error::shape_mismatch("conv bias", [out_c], [bias.len()]));
    }
    Ok(())
}

/// 2-D convolution, `weight` is `[out, in, k, k]`
pub fn conv2d(
    input: ArrayView4<f32>,
    weight: ArrayView4<f32>,
    bias: ArrayView1<f32>,
) -> Result<Array4<f32>> {
    check_conv(&input, &weight, &bias)?;
    let (n, c, h, w) = input.dim();
    let (out_c, _, k, _) = weight.dim();
    let (oh, ow) = (h - k + 1, w - k + 1);

    let kernel = weight.into_shape_with_order((out_c, c * k * k))?;
    let mut output = Array4::zeros((n, out_c, oh, ow));

    for (i, mut out) in output.axis_iter_mut(Axis(0)).enumerate() {
        let cols = im2col(input.index_axis(Axis(0), i), k);
        let y = kernel.dot(&cols);
        let y = y.to_shape((out_c, oh, ow))?;
        out.assign(&y);
    }
    for (o, &b) in bias.iter().enumerate() {
        output.slice_mut(s![.., o, .., ..]).mapv_inplace(|v| v + b);
    }
    Ok(output)
}

/// Backward pass of [`conv2d`]
pub fn conv2d_backward(
    input: ArrayView4<f32>,
    weight: ArrayView4<f32>,
    grad_output: &Array4<f32>,
    need_input_grad: bool,
) -> Result<ConvGrads> {
    let (n, c, h, w) = input.dim();
    let (out_c, _, k, _) = weight.dim();
    let (oh, ow) = (h - k + 1, w - k + 1);
    if grad_output.dim() != (n, out_c, oh, ow) {
        let (gn, gc, gh, gw) = grad_output.dim();
        return Err(Error::shape_mismatch(
            "conv output gradient",
            [n, out_c, oh, ow],
            [gn, gc, gh, gw],
        ));
    }

    let kernel = weight.into_shape_with_order((out_c, c * k * k))?;
    let mut grad_kernel = Array2::<f32>::zeros((out_c, c * k * k));
    let mut grad_input = need_input_grad.then(|| Array4::zeros((n, c, h, w)));

    for i in 0..n {
        let cols = im2col(input.index_axis(Axis(0), i), k);
        let g = grad_output.index_axis(Axis(0), i);
        let g = g.to_shape((out_c, oh * ow))?;

        grad_kernel += &g.dot(&cols.t());
        if let Some(grad_input) = grad_input.as_mut() {
            let grad_cols = kernel.t().dot(&g);
            grad_input
                .index_axis_mut(Axis(0), i)
                .assign(&col2im(&grad_cols, (c, h, w), k));
        }
    }

    let bias = grad_output
        .sum_axis(Axis(3))
        .sum_axis(Axis(2))
        .sum_axis(Axis(0));

    Ok(ConvGrads {
        input: grad_input,
        weight: grad_kernel.into_shape_with_order((out_c, c, k, k))?,
        bias,
    })
}

fn pooled_len(len: usize, kernel: usize, stride: usize) -> usize {
    (len - kernel) / stride + 1
}

/// Max pooling over `kernel x kernel` windows
pub fn max_pool2d(input: &Array4<f32>, kernel: usize, stride: usize) -> Result<Array4<f32>> {
    let (n, c, h, w) = input.dim();
    if kernel == 0 || stride == 0 || h < kernel || w < kernel {
        return Err(Error::shape_mismatch("max pool input", [kernel, kernel], [h, w]));
    }
    let (oh, ow) = (pooled_len(h, kernel, stride), pooled_len(w, kernel, stride));

    Ok(Array4::from_shape_fn((n, c, oh, ow), |(b, ch, oy, ox)| {
        let (y0, x0) = (oy * stride, ox * stride);
        input
            .slice(s![b, ch, y0..y0 + kernel, x0..x0 + kernel])
            .fold(f32::NEG_INFINITY, |m, &v| m.max(v))
    }))
}

/// Backward pass of [`max_pool2d`]; each window routes its gradient to the
/// first position holding the maximum
pub fn max_pool2d_backward(
    input: &Array4<f32>,
    grad_output: &Array4<f32>,
    kernel: usize,
    stride: usize,
) -> Result<Array4<f32>> {
    let (n, c, h, w) = input.dim();
    let expected = (n, c, pooled_len(h, kernel, stride), pooled_len(w, kernel, stride));
    if grad_output.dim() != expected {
        let (gn, gc, gh, gw) = grad_output.dim();
        return Err(Error::shape_mismatch(
            "max pool output gradient",
            [expected.0, expected.1, expected.2, expected.3],
            [gn, gc, gh, gw],
        ));
    }

    let mut grad_input = Array4::zeros((n, c, h, w));
    for ((b, ch, oy, ox), &g) in grad_output.indexed_iter() {
        let (y0, x0) = (oy * stride, ox * stride);
        let mut best = (y0, x0);
        let mut best_value = f32::NEG_INFINITY;
        for y in y0..y0 + kernel {
            for x in x0..x0 + kernel {
                if input[[b, ch, y, x]] > best_value {
                    best_value = input[[b, ch, y, x]];
                    best = (y, x);
                }
            }
        }
        grad_input[[b, ch, best.0, best.1]] += g;
    }
    Ok(grad_input)
}

/// Fully connected layer, `weight` is `[out, in]`
pub fn linear(
    input: &Array2<f32>,
    weight: ArrayView2<f32>,
    bias: ArrayView1<f32>,
) -> Result<Array2<f32>> {
    if input.ncols() != weight.ncols() {
        return Err(Error::shape_mismatch(
            "linear input features",
            [weight.ncols()],
            [input.ncols()],
        ));
    }
    if bias.len() != weight.nrows() {
        return Err(Error::shape_mismatch("linear bias", [weight.nrows()], [bias.len()]));
    }
    Ok(input.dot(&weight.t()) + &bias)
}

/// Backward pass of [`linear`]
pub fn linear_backward(
    input: &Array2<f32>,
    weight: ArrayView2<f32>,
    grad_output: &Array2<f32>,
) -> LinearGrads {
    LinearGrads {
        input: grad_output.dot(&weight),
        weight: grad_output.t().dot(input),
        bias: grad_output.sum_axis(Axis(0)),
    }
}

pub fn relu(input: &Array2<f32>) -> Array2<f32> {
    input.mapv(|v| v.max(0.0))
}

pub fn relu_backward(input: &Array2<f32>, grad_output: &Array2<f32>) -> Array2<f32> {
    let mut grad = grad_output.clone();
    Zip::from(&mut grad).and(input).for_each(|g, &x| {
        if x <= 0.0 {
            *g = 0.0;
        }
    });
    grad
}

/// Row-wise softmax
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut probs = logits.clone();
    for mut row in probs.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}
