use rand::{rngs::StdRng, Rng, SeedableRng};

pub const SYNC: [u8; 8] = [1, 0, 1, 1, 0, 1, 0, 0];

/// Seeded generator so failures are reproducible.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_bits(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0..=1)).collect()
}

/// Flip `num` distinct bits of `bits` chosen at random.
pub fn corrupt(rng: &mut StdRng, bits: &[u8], num: usize) -> Vec<u8> {
    let mut out = bits.to_vec();
    let mut idxs: Vec<usize> = (0..bits.len()).collect();
    for i in 0..num {
        let j = rng.gen_range(i..idxs.len());
        idxs.swap(i, j);
        out[idxs[i]] ^= 1;
    }
    out
}
