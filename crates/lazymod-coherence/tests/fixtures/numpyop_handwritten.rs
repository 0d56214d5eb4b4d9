//! Hand-maintained declaration list for fastestimator.op.numpyop.

pub const DECLARED_EXPORTS: &[&str] = &[
    "Batch",
    "Delete",
    "LambdaOp",
    "NumpyOp",
    "forward_numpyop",
    "meta",
    "multivariate",
    "univariate",
    "univariate",
    "tensorop",
];
