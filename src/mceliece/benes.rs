use crate::mceliece::gf::{gf_bitrev, Gf};
use crate::mceliece::{COND_BYTES, GFBITS, GF_N};
use alloc::vec;
use alloc::vec::Vec;

// A Benes network on 2^13 positions: 2m - 1 = 25 layers of conditional
// pairwise swaps with strides 1, 2, ..., 4096, ..., 2, 1. Control bits are
// generated at keygen by recursive Waksman routing (variable-time, secret
// permutation, keygen only); application is constant-time masked swaps.

const LAYERS: usize = 2 * GFBITS - 1;


/// Stride of layer `l` in a network over n positions.
fn stride(l: usize, n: usize) -> usize {
    let w = n.trailing_zeros() as usize;
    if l < w {
        1 << l
    } else {
        1 << (2 * w - 2 - l)
    }
}


/// Index of the pair (base, base + stride) in a layer's bit order:
/// block-major over 2*stride spans, offset-minor.
fn pair_index(base: usize, stride: usize) -> usize {
    (base / (2 * stride)) * stride + (base % stride)
}


/// Splits `sigma` into first/last layer swap bits plus the two half-size
/// permutations, by 2-coloring the union of output-pair and input-pair
/// constraints. `sigma[i]` is the input position feeding output i.
#[allow(clippy::type_complexity)]
fn route(sigma: &[u32]) -> (Vec<bool>, Vec<bool>, Vec<u32>, Vec<u32>) {
    let n = sigma.len();
    let half = n / 2;

    let mut inverse = vec![0u32; n];
    for (i, &s) in sigma.iter().enumerate() {
        inverse[s as usize] = u32::try_from(i).expect("index fits u32");
    }

    // color 0 routes through the even (upper) subnetwork
    let mut color = vec![2u8; n];
    for start in 0..n {
        if color[start] != 2 {
            continue;
        }
        let mut i = start;
        color[i] = 0;
        loop {
            // an output pair must split across the subnetworks
            let partner = i ^ 1;
            if color[partner] != 2 {
                break;
            }
            color[partner] = 1 - color[i];
            // and so must the two outputs drawing from one input pair
            let next = inverse[(sigma[partner] ^ 1) as usize] as usize;
            if color[next] != 2 {
                break;
            }
            color[next] = 1 - color[partner];
            i = next;
        }
    }

    let mut first = vec![false; half];
    let mut last = vec![false; half];
    let mut even = vec![0u32; half];
    let mut odd = vec![0u32; half];
    for k in 0..half {
        // the last layer sends output 2k through the subnetwork color[2k]
        last[k] = color[2 * k] == 1;
        for c in 0..2 {
            let out = (2 * k + usize::from(last[k])) ^ c; // the output of color c
            let target = sigma[out] as usize;
            if c == 0 {
                even[k] = u32::try_from(target / 2).expect("index fits u32");
            } else {
                odd[k] = u32::try_from(target / 2).expect("index fits u32");
            }
            // the first layer fixes up which member of the input pair is taken
            if c == 0 {
                first[target / 2] = target & 1 == 1;
            }
        }
    }
    (first, last, even, odd)
}


/// Full layer set (2 log2 n - 1 layers of n/2 bits) realizing `sigma`.
fn gen_layers(sigma: &[u32]) -> Vec<Vec<bool>> {
    let n = sigma.len();
    if n == 2 {
        return vec![vec![sigma[0] == 1]];
    }
    let (first, last, even, odd) = route(sigma);
    let sub = [gen_layers(&even), gen_layers(&odd)];

    let w = n.trailing_zeros() as usize;
    let mut layers = Vec::with_capacity(2 * w - 1);
    layers.push(first);
    for l in 0..(2 * (w - 1) - 1) {
        let s = stride(l, n / 2);
        let big = 2 * s;
        let mut bits = vec![false; n / 2];
        for block in (0..n).step_by(2 * big) {
            for offset in 0..big {
                let base = block + offset;
                let parity = base & 1;
                let k = base >> 1;
                bits[pair_index(base, big)] = sub[parity][l][pair_index(k, s)];
            }
        }
        layers.push(bits);
    }
    layers.push(last);
    layers
}


/// Packs the control bits for `pi` (a permutation of 0..2^13) into the
/// (2m-1) * 2^m / 16 byte schedule the applier consumes.
pub(crate) fn controlbits(pi: &[u16; GF_N]) -> Vec<u8> {
    let sigma: Vec<u32> = pi.iter().map(|&x| u32::from(x)).collect();
    let layers = gen_layers(&sigma);
    debug_assert_eq!(layers.len(), LAYERS);

    let mut out = vec![0u8; COND_BYTES];
    for (l, layer) in layers.iter().enumerate() {
        for (i, &bit) in layer.iter().enumerate() {
            let pos = l * (GF_N / 2) + i;
            out[pos / 8] |= u8::from(bit) << (pos % 8);
        }
    }
    out
}


fn get_bit(r: &[u64; GF_N / 64], i: usize) -> u64 { (r[i >> 6] >> (i & 63)) & 1 }


/// Applies the network to a 2^13-bit vector, one masked swap per control
/// bit; the access pattern is independent of both data and control bits.
pub(crate) fn apply_benes(r: &mut [u64; GF_N / 64], bits: &[u8]) {
    debug_assert_eq!(bits.len(), COND_BYTES);
    for l in 0..LAYERS {
        let s = stride(l, GF_N);
        for block in (0..GF_N).step_by(2 * s) {
            for offset in 0..s {
                let base = block + offset;
                let pos = l * (GF_N / 2) + pair_index(base, s);
                let ctrl = u64::from((bits[pos / 8] >> (pos % 8)) & 1);
                let d = (get_bit(r, base) ^ get_bit(r, base + s)) & ctrl;
                r[base >> 6] ^= d << (base & 63);
                r[(base + s) >> 6] ^= d << ((base + s) & 63);
            }
        }
    }
}


/// Instantiates the support tuple: the network applied to the bit planes of
/// the bit-reversed natural ordering, read back column-wise.
pub(crate) fn support_gen(cond: &[u8]) -> Vec<Gf> {
    let mut planes = [[0u64; GF_N / 64]; GFBITS];
    for i in 0..GF_N {
        let a = gf_bitrev(u16::try_from(i).expect("13-bit index"));
        for (j, plane) in planes.iter_mut().enumerate() {
            plane[i >> 6] |= u64::from((a >> j) & 1) << (i & 63);
        }
    }
    for plane in &mut planes {
        apply_benes(plane, cond);
    }
    let mut support = vec![Gf::default(); GF_N];
    for (i, slot) in support.iter_mut().enumerate() {
        let mut v = Gf::default();
        for j in (0..GFBITS).rev() {
            v = (v << 1) | u16::try_from(get_bit(&planes[j], i)).expect("bit");
        }
        *slot = v;
    }
    support
}


/// Constant-time sorting network over 63-bit keys, used to detect repeated
/// entries in the candidate permutation.
pub(crate) fn sort_63b(x: &mut [u64]) {
    fn minmax(a: &mut u64, b: &mut u64) {
        // keys stay below 2^63, so the borrow bit alone decides the order
        let c = ((*b).wrapping_sub(*a) >> 63).wrapping_neg() & (*a ^ *b);
        *a ^= c;
        *b ^= c;
    }

    let n = x.len();
    if n < 2 {
        return;
    }
    let mut top = 1;
    while top < n - top {
        top += top;
    }
    let mut p = top;
    while p > 0 {
        for i in 0..n - p {
            if i & p == 0 {
                let (lo, hi) = x.split_at_mut(i + p);
                minmax(&mut lo[i], &mut hi[0]);
            }
        }
        let mut q = top;
        while q > p {
            for i in 0..n - q {
                if i & p == 0 {
                    let (lo, hi) = x.split_at_mut(i + q);
                    minmax(&mut lo[i + p], &mut hi[0]);
                }
            }
            q >>= 1;
        }
        p >>= 1;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Applies the generated network to the identity sequence and checks it
    /// realizes exactly pi: out[i] = in[pi[i]].
    #[test]
    fn test_controlbits_realize_permutation() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let mut pi: [u16; GF_N] = core::array::from_fn(|i| u16::try_from(i).expect("13-bit"));
        pi.shuffle(&mut rng);
        let cond = controlbits(&pi);
        assert_eq!(cond.len(), COND_BYTES);

        // track a handful of single-bit probes through the network
        for probe in [0usize, 1, 77, 4095, 8191] {
            let mut r = [0u64; GF_N / 64];
            r[probe >> 6] = 1u64 << (probe & 63);
            apply_benes(&mut r, &cond);
            // input position `probe` must land at the output i with pi[i] = probe
            let expect = pi.iter().position(|&x| usize::from(x) == probe).unwrap();
            assert_eq!(get_bit(&r, expect), 1);
            let ones: u32 = r.iter().map(|w| w.count_ones()).sum();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn test_support_entries_distinct() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        let mut pi: [u16; GF_N] = core::array::from_fn(|i| u16::try_from(i).expect("13-bit"));
        pi.shuffle(&mut rng);
        let cond = controlbits(&pi);
        let support = support_gen(&cond);
        let mut seen = alloc::vec![false; GF_N];
        for &s in &support {
            assert!(!seen[usize::from(s)]);
            seen[usize::from(s)] = true;
        }
    }

    #[test]
    fn test_sort_63b() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
        let mut v: Vec<u64> =
            (0..1000).map(|_| rand::Rng::gen::<u64>(&mut rng) >> 1).collect();
        sort_63b(&mut v);
        assert!(v.windows(2).all(|w| w[0] <= w[1]));
    }
}
