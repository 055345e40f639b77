use std::time::Duration;

use optpack::BoxError;

const PAYLOAD_LEN: usize = 12;

/// Seconds as big-endian `u64`, then subsecond nanos as big-endian `u32`.
pub fn encode_duration(d: &Duration) -> Result<Vec<u8>, BoxError> {
    let mut out = Vec::with_capacity(PAYLOAD_LEN);
    out.extend_from_slice(&d.as_secs().to_be_bytes());
    out.extend_from_slice(&d.subsec_nanos().to_be_bytes());
    Ok(out)
}

pub fn decode_duration(d: &mut Duration, data: &[u8]) -> Result<(), BoxError> {
    if data.len() != PAYLOAD_LEN {
        return Err(format!("duration payload must be {PAYLOAD_LEN} bytes, got {}", data.len()).into());
    }
    let (secs, nanos) = data.split_at(8);
    let secs = u64::from_be_bytes(secs.try_into()?);
    let nanos = u32::from_be_bytes(nanos.try_into()?);
    if nanos >= 1_000_000_000 {
        return Err(format!("subsecond nanos out of range: {nanos}").into());
    }
    *d = Duration::new(secs, nanos);
    Ok(())
}
