use criterion::{criterion_group, criterion_main, Criterion};
use pqcore::traits::{Decaps, Encaps, KeyGen, SigGen, Signer, Verifier};
use pqcore::{dilithium_iii, kyber_768, ntru_s3, sphincs_shake_128s};
use rand_core::{CryptoRng, RngCore};


// Deterministic xorshift RNG so benchmark inputs are reproducible
struct TestRng {
    value: u32,
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.iter_mut().for_each(|b| {
            self.value ^= self.value << 13;
            self.value ^= self.value >> 17;
            self.value ^= self.value << 5;
            *b = self.value.to_le_bytes()[0];
        });
        Ok(())
    }
}

impl CryptoRng for TestRng {}


#[allow(clippy::redundant_closure)]
pub fn criterion_benchmark(c: &mut Criterion) {
    // Generate intermediate values needed for the actual benchmark functions
    let mut bench_rng = TestRng { value: 0x2545_F491 };

    let (ek_kyber, dk_kyber) = kyber_768::KG::try_keygen_with_rng(&mut bench_rng).unwrap();
    let (_, ct_kyber) = ek_kyber.try_encaps_with_rng(&mut bench_rng).unwrap();

    let (ek_ntru, dk_ntru) = ntru_s3::KG::try_keygen_with_rng(&mut bench_rng).unwrap();
    let (_, ct_ntru) = ek_ntru.try_encaps_with_rng(&mut bench_rng).unwrap();

    let (vk_dil, sk_dil) = dilithium_iii::KG::try_keygen_with_rng(&mut bench_rng).unwrap();
    let signed_dil = sk_dil.try_sign(b"benchmark message").unwrap();

    let (vk_spx, sk_spx) = sphincs_shake_128s::KG::try_keygen_with_rng(&mut bench_rng).unwrap();
    let signed_spx = sk_spx.try_sign(b"benchmark message").unwrap();

    c.bench_function("kyber_768 keygen", |b| {
        b.iter(|| kyber_768::KG::try_keygen_with_rng(&mut bench_rng))
    });
    c.bench_function("kyber_768 encaps", |b| {
        b.iter(|| ek_kyber.try_encaps_with_rng(&mut bench_rng))
    });
    c.bench_function("kyber_768 decaps", |b| b.iter(|| dk_kyber.try_decaps(&ct_kyber)));

    c.bench_function("ntru_s3 keygen", |b| {
        b.iter(|| ntru_s3::KG::try_keygen_with_rng(&mut bench_rng))
    });
    c.bench_function("ntru_s3 encaps", |b| b.iter(|| ek_ntru.try_encaps_with_rng(&mut bench_rng)));
    c.bench_function("ntru_s3 decaps", |b| b.iter(|| dk_ntru.try_decaps(&ct_ntru)));

    c.bench_function("dilithium_iii keygen", |b| {
        b.iter(|| dilithium_iii::KG::try_keygen_with_rng(&mut bench_rng))
    });
    c.bench_function("dilithium_iii sign", |b| b.iter(|| sk_dil.try_sign(b"benchmark message")));
    c.bench_function("dilithium_iii verify", |b| b.iter(|| vk_dil.try_open(&signed_dil)));

    c.bench_function("sphincs_shake_128s sign", |b| b.iter(|| sk_spx.try_sign(b"benchmark message")));
    c.bench_function("sphincs_shake_128s verify", |b| b.iter(|| vk_spx.try_open(&signed_spx)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
