use super::estimation::ErrorEstimate;
use super::sifting::SiftedKey;

/// Bob's sifted bits that were never disclosed, in sifted order.
pub fn distill_bits(key: &SiftedKey, estimate: &ErrorEstimate) -> Vec<bool> {
    let mut disclosed = vec![false; key.len()];
    for &i in &estimate.sample {
        if let Some(slot) = disclosed.get_mut(i) {
            *slot = true;
        }
    }

    key.bob_bits
        .iter()
        .zip(disclosed)
        .filter(|&(_, was_disclosed)| !was_disclosed)
        .map(|(&bit, _)| bit)
        .collect()
}

/// The final key as a string of `'0'`/`'1'` characters.
pub fn distill(key: &SiftedKey, estimate: &ErrorEstimate) -> String {
    bits_to_string(&distill_bits(key, estimate))
}

pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}
