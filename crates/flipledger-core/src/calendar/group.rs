//! Generic keyed fold shared by every series builder

use std::collections::BTreeMap;

/// Fold `records` into one aggregate per key.
///
/// `key_fn` returning `None` drops the record. Keys come back in `Ord` order,
/// so chronological keys yield a chronological map.
///
/// # Examples
/// ```
/// use flipledger_core::calendar::group_by_key;
///
/// let prices = [3.0, 5.0, 12.0, 7.5];
/// let by_band = group_by_key(
///     &prices,
///     |p| Some(if *p < 6.0 { "cheap" } else { "pricey" }),
///     |total: &mut f64, p| *total += *p,
/// );
/// assert_eq!(by_band["cheap"], 8.0);
/// assert_eq!(by_band["pricey"], 19.5);
/// ```
pub fn group_by_key<'a, R, K, A, KF, F>(
    records: impl IntoIterator<Item = &'a R>,
    mut key_fn: KF,
    mut fold: F,
) -> BTreeMap<K, A>
where
    R: 'a + ?Sized,
    K: Ord,
    A: Default,
    KF: FnMut(&R) -> Option<K>,
    F: FnMut(&mut A, &R),
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();

    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        fold(groups.entry(key).or_default(), record);
    }

    groups
}
