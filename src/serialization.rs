use anyhow::{anyhow, Result};
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// Canonically serializes any arkworks type into a lowercase hex string without a prefix.
pub fn canonical_serialize_hex<T>(value: &T) -> Result<String>
where
    T: CanonicalSerialize,
{
    let mut buf = Vec::new();
    value
        .serialize_compressed(&mut buf)
        .map_err(|err| anyhow!("canonical serialize failed: {err}"))?;
    Ok(hex::encode(buf))
}

/// Decodes a lowercase hex string (with or without `0x` prefix) into an arkworks type.
pub fn canonical_deserialize_hex<T>(value: &str) -> Result<T>
where
    T: CanonicalDeserialize,
{
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).map_err(|err| anyhow!("invalid hex: {err}"))?;
    T::deserialize_compressed(bytes.as_slice())
        .map_err(|err| anyhow!("canonical deserialize failed: {err}"))
}

/// Canonically serializes a curve point and returns it as lowercase hex.
pub fn serialize_curve_hex<C>(value: &C) -> Result<String>
where
    C: CurveGroup + CanonicalSerialize,
{
    canonical_serialize_hex(value).map_err(|err| anyhow!("failed to serialize curve point: {err}"))
}

/// Decodes a curve point from lowercase hex.
pub fn deserialize_curve_hex<C>(value: &str) -> Result<C>
where
    C: CurveGroup + CanonicalDeserialize,
{
    canonical_deserialize_hex(value)
        .map_err(|err| anyhow!("failed to deserialize curve point: {err}"))
}
