use digest::{Digest, ExtendableOutput, Mac, Update, XofReader};

/// Object-safe view over the digest, XOF and MAC state machines so one
/// handle type can drive any of them.
pub(crate) trait Accumulator: Send {
    fn update(&mut self, data: &[u8]);

    /// Consumes the state. `output_len` only matters for XOFs.
    fn finalize(self: Box<Self>, output_len: usize) -> Vec<u8>;

    fn box_clone(&self) -> Box<dyn Accumulator>;
}

pub(crate) struct Fixed<D>(pub(crate) D);

impl<D> Accumulator for Fixed<D>
where
    D: Digest + Clone + Send + 'static,
{
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>, _output_len: usize) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(Fixed(self.0.clone()))
    }
}

pub(crate) struct Xof<X>(pub(crate) X);

impl<X> Accumulator for Xof<X>
where
    X: Update + ExtendableOutput + Clone + Send + 'static,
{
    fn update(&mut self, data: &[u8]) {
        Update::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>, output_len: usize) -> Vec<u8> {
        let mut out = vec![0u8; output_len];
        self.0.finalize_xof().read(&mut out);
        out
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(Xof(self.0.clone()))
    }
}

pub(crate) struct Keyed<M>(pub(crate) M);

impl<M> Accumulator for Keyed<M>
where
    M: Mac + Clone + Send + 'static,
{
    fn update(&mut self, data: &[u8]) {
        Mac::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>, _output_len: usize) -> Vec<u8> {
        self.0.finalize().into_bytes().to_vec()
    }

    fn box_clone(&self) -> Box<dyn Accumulator> {
        Box::new(Keyed(self.0.clone()))
    }
}
