use crate::tensor::Tensor4;

/// Index conventions for two-electron integrals
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntegralOrdering {
    /// (pq|rs) = ∫∫ p(1) q(1) r₁₂⁻¹ r(2) s(2)
    Chemist,
    /// <pq|rs> = (pr|qs)
    Physicist,
    /// V_pqrs = (ps|qr), the coefficient of a†_p a†_q a_r a_s in the hamiltonian
    Operator,
}

impl IntegralOrdering {
    /// axes that turn a chemist ordered tensor into this ordering
    fn from_chemist_axes(self) -> [usize; 4] {
        match self {
            IntegralOrdering::Chemist => [0, 1, 2, 3],
            IntegralOrdering::Physicist => [0, 2, 1, 3],
            IntegralOrdering::Operator => [0, 2, 3, 1],
        }
    }

    /// axes that turn a tensor in this ordering into chemist ordering
    fn to_chemist_axes(self) -> [usize; 4] {
        match self {
            IntegralOrdering::Chemist => [0, 1, 2, 3],
            IntegralOrdering::Physicist => [0, 2, 1, 3],
            IntegralOrdering::Operator => [0, 3, 1, 2],
        }
    }
}

/// Reorder the indices of a two-electron integral tensor from one convention to another
pub fn convert_ordering(tensor: &Tensor4, from: IntegralOrdering, to: IntegralOrdering) -> Tensor4 {
    if from == to {
        return tensor.clone();
    }

    let chemist = match from {
        IntegralOrdering::Chemist => tensor.clone(),
        other => tensor.permuted(other.to_chemist_axes()),
    };

    match to {
        IntegralOrdering::Chemist => chemist,
        other => chemist.permuted(other.from_chemist_axes()),
    }
}
