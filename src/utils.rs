use ndarray::{ArrayBase, DataMut, Dimension};

/// A trait to replace all elements in a container with zeros.
pub trait ZeroOut {
    fn zero_out(&mut self);
}

impl<T> ZeroOut for [T]
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        for elem in self {
            elem.zero_out();
        }
    }
}

impl<T> ZeroOut for Vec<T>
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        self.as_mut_slice().zero_out();
    }
}

impl<S, D> ZeroOut for ArrayBase<S, D>
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    fn zero_out(&mut self) {
        self.fill(0.0);
    }
}
