use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Returns a `rows × cols` matrix drawn from `N(0, 1/cols)`.
pub fn random<R>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64>
where
    R: Rng + ?Sized,
{
    let scale = (1.0 / cols.max(1) as f64).sqrt();
    Array2::from_shape_simple_fn((rows, cols), || {
        let x: f64 = StandardNormal.sample(&mut *rng);
        x * scale
    })
}

/// Returns `a ⊗ b`, a matrix of shape `a.len() × b.len()`.
pub fn outer(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Array2<f64> {
    let column = a.insert_axis(ndarray::Axis(1));
    let row = b.insert_axis(ndarray::Axis(0));
    column.dot(&row)
}

pub fn frobenius_norm(m: ArrayView2<f64>) -> f64 {
    m.iter().map(|x| x * x).sum::<f64>().sqrt()
}
