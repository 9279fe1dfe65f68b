use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) const SUFFIX_LEN: usize = 6;

/// Lowercase base-36 string of `len` random characters.
pub(crate) fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}

/// `"{millis}-{suffix}"`, used for fan uploads.
pub(crate) fn timestamped(millis: i64) -> String {
    format!("{millis}-{}", random_suffix(SUFFIX_LEN))
}
