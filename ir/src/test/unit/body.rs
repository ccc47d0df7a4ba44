use crate::body::{Body, BodyBuilder, Inst};
use crate::error::Error;
use crate::offset::Offset;
use crate::types::{ComputeOp, ConstValue, ScalarType};

#[test]
fn test_identity_body() {
    let body = Body::identity(ScalarType::Float32);
    assert_eq!(body.params(), &[ScalarType::Float32]);
    assert_eq!(body.insts()[0], Inst::Access { param: 0, offset: Offset::ZERO });
    assert!(body.insts()[1].is_return());
    assert_eq!(body.result_types().as_slice(), &[ScalarType::Float32]);
}

#[test]
fn test_builder_result_types() {
    let mut b = BodyBuilder::new([ScalarType::Float64, ScalarType::Int32]);
    let x = b.access(0, Offset::new(1, 0, 0)).unwrap();
    let i = b.access(1, Offset::ZERO).unwrap();
    let c = b.constant(ConstValue::Float(0.5));
    let y = b.compute(ComputeOp::Mul, &[x, c]).unwrap();
    let body = b.finish(&[y, i]).unwrap();

    assert_eq!(body.result_types().as_slice(), &[ScalarType::Float64, ScalarType::Int32]);
    assert_eq!(body.returns().len(), 2);
    assert!(body.reads_param(1));
    assert_eq!(body.accesses().collect::<Vec<_>>(), vec![(0, Offset::new(1, 0, 0)), (1, Offset::ZERO)]);
}

#[test]
fn test_access_unknown_parameter() {
    let mut b = BodyBuilder::new([ScalarType::Float64]);
    let err = b.access(3, Offset::ZERO).unwrap_err();
    assert_eq!(err, Error::AccessUnknownParameter { param: 3, params: 1 });
}

#[test]
fn test_compute_arity() {
    let mut b = BodyBuilder::new([ScalarType::Float64]);
    let x = b.access(0, Offset::ZERO).unwrap();
    let err = b.compute(ComputeOp::Add, &[x]).unwrap_err();
    assert!(matches!(err, Error::ComputeArity { op: ComputeOp::Add, expected: 2, actual: 1 }));
}

#[test]
fn test_forward_reference_rejected() {
    let mut other = BodyBuilder::new([ScalarType::Float64]);
    other.access(0, Offset::ZERO).unwrap();
    let later = other.access(0, Offset::ZERO).unwrap();

    let b = BodyBuilder::new([ScalarType::Float64]);
    assert!(matches!(b.finish(&[later]), Err(Error::UndefinedLocal { .. })));
}

#[test]
fn test_splice_shifts_accesses() {
    let mut inner = BodyBuilder::new([ScalarType::Float64]);
    let a = inner.access(0, Offset::new(1, 0, 0)).unwrap();
    let b = inner.access(0, Offset::new(-1, 0, 0)).unwrap();
    let sum = inner.compute(ComputeOp::Add, &[a, b]).unwrap();
    let inner = inner.finish(&[sum]).unwrap();

    let shift = Offset::new(0, 2, 0);
    let mut outer = BodyBuilder::new([ScalarType::Float64]);
    let returns = outer.splice(&inner, |b, param, offset| b.access(param, offset.compose(shift))).unwrap();
    let body = outer.finish(&returns).unwrap();

    assert_eq!(body.accesses().map(|(_, o)| o).collect::<Vec<_>>(), vec![Offset::new(1, 2, 0), Offset::new(-1, 2, 0)]);
    assert_eq!(body.insts().len(), inner.insts().len());
}
