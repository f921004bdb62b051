//! Point and scalar arithmetic on the alt_bn128 G1 group.
//!
//! This is the curve behind the EVM `ecAdd`/`ecMul` precompiles:
//!
//! - field modulus `p = 21888242871839275222246405745257275088696311157297823662689037894645226208583`
//! - curve `y^2 = x^3 + 3`
//! - base point `G = (1, 2)`
//! - group order `r = 21888242871839275222246405745257275088548364400416034343698204186575808495617`
//!
//! Points travel as two big-endian 32-byte coordinates with `(0, 0)` standing
//! for the point at infinity. Every function is pure and deterministic, and
//! out-of-range inputs are rejected rather than reduced.

use ark_bn254::{Fq, Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInt, BigInteger, PrimeField, Zero};
use rand::{CryptoRng, RngCore};

use sale_types::{CurvePoint, Word};

use crate::error::CryptoError;

/// An auction keypair: `public_key = private_key · G`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionKeypair {
    pub private_key: Word,
    pub public_key: CurvePoint,
}

impl AuctionKeypair {
    /// Generate a fresh keypair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let scalar = random_scalar(rng);
        Self {
            private_key: field_to_word(&scalar),
            public_key: encode_point(&(G1Projective::from(G1Affine::generator()) * scalar).into_affine()),
        }
    }

    /// Rebuild a keypair from an existing private key.
    pub fn from_private_key(private_key: Word) -> Result<Self, CryptoError> {
        let public_key = public_key_from_private(&private_key)?;
        Ok(Self {
            private_key,
            public_key,
        })
    }
}

/// The base point `G = (1, 2)`.
pub fn generator() -> CurvePoint {
    encode_point(&G1Affine::generator())
}

/// Whether `point` is a valid public key: on the curve and not infinity.
pub fn is_valid(point: &CurvePoint) -> bool {
    matches!(decode_point(point), Ok(p) if !p.is_zero())
}

/// Multiply `base` by `scalar`.
pub fn scalar_multiply(base: &CurvePoint, scalar: &Word) -> Result<CurvePoint, CryptoError> {
    let point = decode_point(base)?;
    let s = scalar_from_word(scalar)?;
    Ok(encode_point(&(G1Projective::from(point) * s).into_affine()))
}

/// Derive the public key `private_key · G`.
pub fn public_key_from_private(private_key: &Word) -> Result<CurvePoint, CryptoError> {
    scalar_multiply(&generator(), private_key)
}

/// ECDH shared point `private_key · public_key`.
pub fn shared_secret(public_key: &CurvePoint, private_key: &Word) -> Result<CurvePoint, CryptoError> {
    if public_key.is_identity() {
        return Err(CryptoError::PointAtInfinity);
    }
    scalar_multiply(public_key, private_key)
}

/// Check that `private_key · G == public_key`.
pub fn is_private_key_valid(private_key: &Word, public_key: &CurvePoint) -> bool {
    matches!(public_key_from_private(private_key), Ok(derived) if derived == *public_key)
}

/// Sample a uniformly random non-zero private key.
pub fn random_private_key<R: RngCore + CryptoRng>(rng: &mut R) -> Word {
    field_to_word(&random_scalar(rng))
}

fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Fr {
    loop {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        let scalar = Fr::from_be_bytes_mod_order(&wide);
        if !scalar.is_zero() {
            return scalar;
        }
    }
}

/// Decode a point, rejecting coordinates `>= p` and points off the curve.
///
/// `(0, 0)` decodes to the point at infinity.
pub fn decode_point(point: &CurvePoint) -> Result<G1Affine, CryptoError> {
    if point.is_identity() {
        return Ok(G1Affine::zero());
    }
    let x = Fq::from_bigint(word_to_bigint(&point.x)).ok_or(CryptoError::PointNotOnCurve)?;
    let y = Fq::from_bigint(word_to_bigint(&point.y)).ok_or(CryptoError::PointNotOnCurve)?;
    let affine = G1Affine::new_unchecked(x, y);
    // G1 has cofactor 1, so being on the curve implies subgroup membership
    if !affine.is_on_curve() {
        return Err(CryptoError::PointNotOnCurve);
    }
    Ok(affine)
}

/// Encode an affine point as big-endian coordinates.
pub fn encode_point(point: &G1Affine) -> CurvePoint {
    match point.xy() {
        Some((x, y)) => CurvePoint::new(field_to_word(x), field_to_word(y)),
        None => CurvePoint::default(),
    }
}

/// Parse a scalar, requiring `0 < k < r`.
fn scalar_from_word(word: &Word) -> Result<Fr, CryptoError> {
    let scalar = Fr::from_bigint(word_to_bigint(word)).ok_or(CryptoError::InvalidScalar)?;
    if scalar.is_zero() {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(scalar)
}

fn word_to_bigint(word: &Word) -> BigInt<4> {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let start = 32 - (i + 1) * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&word[start..start + 8]);
        *limb = u64::from_be_bytes(bytes);
    }
    BigInt::new(limbs)
}

fn field_to_word<F: PrimeField>(element: &F) -> Word {
    let bytes = element.into_bigint().to_bytes_be();
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    word
}
