use crate::config::SystemParams;
use crate::error::PkeError;
use crate::group;
use ark_ec::CurveGroup;
use ark_serialize::CanonicalSerialize;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const LOG_TARGET: &str = "elgamal::dlog::table";

const TABLE_MAGIC: [u8; 16] = *b"ELGAMAL-DLOG-TBL";
const TAG_DOMAIN: &[u8] = b"elgamal-pke/dlog-table/v1";
const HEADER_LEN: usize = 20;

/// Points are normalized to affine in batches of this size during the build.
const NORMALIZE_BATCH: usize = 2048;

/// In-memory baby-step table: compressed point bytes to index.
pub type BabyStepMap = HashMap<Vec<u8>, u64>;

/// Two-byte tag binding a table file to its curve and base point.
fn curve_tag<C: CurveGroup>(base: &C) -> [u8; 2] {
    let mut hasher = Shake128::default();
    hasher.update(TAG_DOMAIN);
    hasher.update(&group::point_to_bytes(base));
    let mut tag = [0u8; 2];
    hasher.finalize_xof().read(&mut tag);
    tag
}

/// File path for the table of `(base, L, t)` inside `dir`.
///
/// The parameters are embedded in the name so that distinct configurations
/// never collide on disk.
pub fn table_path<C: CurveGroup>(dir: &Path, base: &C, params: &SystemParams) -> PathBuf {
    dir.join(format!(
        "dlog-{}-L{}-t{}.table",
        hex::encode(curve_tag(base)),
        params.msg_bits,
        params.tuning
    ))
}

fn header<C: CurveGroup>(base: &C, params: &SystemParams) -> [u8; HEADER_LEN] {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[..16].copy_from_slice(&TABLE_MAGIC);
    bytes[16..18].copy_from_slice(&curve_tag(base));
    bytes[18] = params.msg_bits as u8;
    bytes[19] = params.tuning as u8;
    bytes
}

fn write_records<C: CurveGroup>(points: &[C], next_index: &mut u64, out: &mut Vec<u8>) {
    for affine in C::normalize_batch(points) {
        affine
            .serialize_compressed(&mut *out)
            .expect("compressed serialization into a Vec cannot fail");
        out.extend_from_slice(&next_index.to_le_bytes());
        *next_index += 1;
    }
}

/// Compute `{ser(i * base) -> i : i in [0, 2^(L/2 + t))}` and persist it.
///
/// The index range is split into contiguous chunks, one per IO worker; each
/// worker pays a single scalar multiplication for its start point and walks
/// the rest by point addition. Buffers are concatenated in index order, so
/// the file body is ascending.
pub fn build_and_persist<C: CurveGroup>(
    base: &C,
    params: &SystemParams,
    path: &Path,
) -> Result<(), PkeError> {
    let n = params.baby_count();
    let threads = params.io_threads.max(1).min(n as usize) as u64;
    let per_worker = n / threads;
    let record_len = group::compressed_point_size::<C>() + 8;
    let base = *base;
    let base_affine = base.into_affine();

    tracing::info!(
        target: LOG_TARGET,
        entries = n,
        workers = threads,
        path = %path.display(),
        "building baby-step table"
    );
    let started = Instant::now();

    let buffers: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let start = worker * per_worker;
                let end = if worker == threads - 1 {
                    n
                } else {
                    start + per_worker
                };
                scope.spawn(move || {
                    let mut buf = Vec::with_capacity((end - start) as usize * record_len);
                    let mut pending: Vec<C> = Vec::with_capacity(NORMALIZE_BATCH);
                    let mut next_index = start;
                    let mut current = base * C::ScalarField::from(start);
                    for _ in start..end {
                        pending.push(current);
                        current += base_affine;
                        if pending.len() == NORMALIZE_BATCH {
                            write_records(&pending, &mut next_index, &mut buf);
                            pending.clear();
                        }
                    }
                    write_records(&pending, &mut next_index, &mut buf);
                    buf
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(buf) => buf,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&header(&base, params))?;
    for buf in &buffers {
        writer.write_all(buf)?;
    }
    writer.flush()?;

    tracing::info!(
        target: LOG_TARGET,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "baby-step table persisted"
    );
    Ok(())
}

/// Load a persisted table, rejecting files whose header or size does not
/// match `(base, L, t)`.
pub fn load<C: CurveGroup>(
    base: &C,
    params: &SystemParams,
    path: &Path,
) -> Result<BabyStepMap, PkeError> {
    let n = params.baby_count();
    let record_len = group::compressed_point_size::<C>() + 8;
    let expected_len = HEADER_LEN as u64 + n * record_len as u64;
    let actual_len = std::fs::metadata(path)?.len();
    if actual_len != expected_len {
        return Err(PkeError::TableMismatch(format!(
            "table file is {actual_len} bytes, expected {expected_len}"
        )));
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut file_header = [0u8; HEADER_LEN];
    reader.read_exact(&mut file_header)?;
    let expected_header = header(base, params);
    if file_header[..16] != expected_header[..16] {
        return Err(PkeError::TableMismatch("bad magic".into()));
    }
    if file_header[16..18] != expected_header[16..18] {
        return Err(PkeError::TableMismatch(
            "curve tag does not match the configured base point".into(),
        ));
    }
    if file_header[18..] != expected_header[18..] {
        return Err(PkeError::TableMismatch(format!(
            "table was built for L={} t={}, expected L={} t={}",
            file_header[18], file_header[19], params.msg_bits, params.tuning
        )));
    }

    let started = Instant::now();
    let mut map = BabyStepMap::with_capacity((n as f64 / 0.7) as usize);
    let mut record = vec![0u8; record_len];
    for _ in 0..n {
        reader.read_exact(&mut record)?;
        let key = record[..record_len - 8].to_vec();
        let index = u64::from_le_bytes(
            record[record_len - 8..]
                .try_into()
                .expect("record tail is exactly eight bytes"),
        );
        map.insert(key, index);
    }
    tracing::info!(
        target: LOG_TARGET,
        entries = n,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "baby-step table loaded"
    );
    Ok(map)
}

/// Build-if-absent, then load. The standard initialization path.
pub fn load_or_build<C: CurveGroup>(
    base: &C,
    params: &SystemParams,
    dir: &Path,
) -> Result<BabyStepMap, PkeError> {
    let path = table_path(dir, base, params);
    if !path.exists() {
        std::fs::create_dir_all(dir)?;
        build_and_persist(base, params, &path)?;
    }
    load(base, params, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::G1Projective;
    use ark_ec::PrimeGroup;

    type Curve = G1Projective;
    type Scalar = <Curve as PrimeGroup>::ScalarField;

    fn test_params() -> SystemParams {
        SystemParams::new(16, 2, 4, 4).unwrap()
    }

    #[test]
    fn build_load_round_trip() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let dir = tempfile::tempdir().unwrap();
        let params = test_params();
        let g = Curve::generator();
        let map = load_or_build(&g, &params, dir.path()).unwrap();
        assert_eq!(map.len(), params.baby_count() as usize);

        for i in [0u64, 1, 2, params.baby_count() - 1] {
            let point = g * Scalar::from(i);
            assert_eq!(map.get(&group::point_to_bytes(&point)), Some(&i));
        }

        // A second call loads the persisted file.
        let reloaded = load_or_build(&g, &params, dir.path()).unwrap();
        assert_eq!(reloaded.len(), map.len());
    }

    #[test]
    fn corrupted_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let params = test_params();
        let g = Curve::generator();
        let path = table_path(dir.path(), &g, &params);
        build_and_persist(&g, &params, &path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[3] ^= 0x01;
        std::fs::write(&path, &bytes).unwrap();
        assert!(matches!(
            load(&g, &params, &path),
            Err(PkeError::TableMismatch(_))
        ));
    }

    #[test]
    fn truncated_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let params = test_params();
        let g = Curve::generator();
        let path = table_path(dir.path(), &g, &params);
        build_and_persist(&g, &params, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(
            load(&g, &params, &path),
            Err(PkeError::TableMismatch(_))
        ));
    }

    #[test]
    fn path_encodes_parameters_and_base() {
        let dir = tempfile::tempdir().unwrap();
        let params = test_params();
        let other_params = SystemParams::new(16, 3, 4, 4).unwrap();
        let g = Curve::generator();
        let h = g * Scalar::from(5u64);

        let by_params = table_path(dir.path(), &g, &params);
        assert_ne!(by_params, table_path(dir.path(), &g, &other_params));
        assert_ne!(by_params, table_path(dir.path(), &h, &params));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let params = test_params();
        let g = Curve::generator();
        let path = table_path(dir.path(), &g, &params);
        assert!(matches!(load(&g, &params, &path), Err(PkeError::Io(_))));
    }
}
