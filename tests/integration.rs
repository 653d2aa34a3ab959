use pqcore::traits::{Decaps, Encaps, KeyGen, SerDes, SigGen, Signer, Verifier};
use pqcore::{dilithium_iii, kyber_768, mceliece_6960_119, ntru_s3, sphincs_shake_128s};
use rand_chacha::rand_core::SeedableRng;


#[test]
fn test_expected_flow_kyber() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    for _i in 0..25 {
        // Alice runs KeyGen, and serializes ek for Bob (to bytes)
        let (alice_ek, alice_dk) = kyber_768::KG::try_keygen_with_rng(&mut rng).unwrap();
        let alice_ek_bytes = alice_ek.into_bytes();

        // Alice sends ek bytes to Bob
        let bob_ek_bytes = alice_ek_bytes;

        // Bob deserializes ek bytes, runs Encaps, and serializes ct for Alice
        let bob_ek = kyber_768::EncapsKey::try_from_bytes(bob_ek_bytes).unwrap();
        let (bob_ssk, bob_ct) = bob_ek.try_encaps_with_rng(&mut rng).unwrap();
        let bob_ct_bytes = bob_ct.into_bytes();

        // Bob sends ct bytes to Alice; Alice deserializes and runs Decaps
        let alice_ct = kyber_768::CipherText::try_from_bytes(bob_ct_bytes).unwrap();
        let alice_ssk = alice_dk.try_decaps(&alice_ct).unwrap();

        // Alice and Bob now have the same shared secret key
        assert_eq!(bob_ssk, alice_ssk);

        // Double check the correspondence of the serialized keypair
        let alice_dk_bytes = alice_dk.into_bytes();
        assert!(kyber_768::KG::validate_keypair_vartime(&alice_ek_bytes, &alice_dk_bytes));
    }
}


#[test]
fn test_expected_flow_ntru_prime() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
    for _i in 0..5 {
        let (alice_ek, alice_dk) = ntru_s3::KG::try_keygen_with_rng(&mut rng).unwrap();
        let alice_ek_bytes = alice_ek.into_bytes();

        let bob_ek = ntru_s3::EncapsKey::try_from_bytes(alice_ek_bytes).unwrap();
        let (bob_ssk, bob_ct) = bob_ek.try_encaps_with_rng(&mut rng).unwrap();

        let alice_ct = ntru_s3::CipherText::try_from_bytes(bob_ct.into_bytes()).unwrap();
        let alice_ssk = alice_dk.try_decaps(&alice_ct).unwrap();
        assert_eq!(bob_ssk, alice_ssk);
    }
}


#[test]
fn test_expected_flow_mceliece() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
    let (alice_ek, alice_dk) = mceliece_6960_119::KG::try_keygen_with_rng(&mut rng).unwrap();
    let alice_ek_bytes = alice_ek.into_bytes();
    assert_eq!(alice_ek_bytes.len(), mceliece_6960_119::EK_LEN);

    let bob_ek = mceliece_6960_119::EncapsKey::try_from_bytes(alice_ek_bytes).unwrap();
    // several encapsulations under one (expensive) keypair
    for _i in 0..5 {
        let (bob_ssk, bob_ct) = bob_ek.try_encaps_with_rng(&mut rng).unwrap();
        let alice_ct = mceliece_6960_119::CipherText::try_from_bytes(bob_ct.into_bytes()).unwrap();
        let alice_ssk = alice_dk.try_decaps(&alice_ct).unwrap();
        assert_eq!(bob_ssk, alice_ssk);
    }
}


#[test]
fn test_expected_flow_dilithium() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
    for msg in [&b""[..], &b"a"[..], &[0u8; 3333][..]] {
        // The signer generates a keypair and publishes the verifying key
        let (vk, sk) = dilithium_iii::KG::try_keygen_with_rng(&mut rng).unwrap();
        let vk_bytes = vk.into_bytes();

        // sign-and-message envelope travels as one blob
        let signed = sk.try_sign(msg).unwrap();
        assert_eq!(signed.len(), dilithium_iii::SIG_LEN + msg.len());

        // The verifier authenticates and recovers the message
        let vk2 = dilithium_iii::VerifyingKey::try_from_bytes(vk_bytes).unwrap();
        let opened = vk2.try_open(&signed).unwrap();
        assert_eq!(opened, msg);
    }
}


#[test]
fn test_expected_flow_sphincs() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(654);
    let (vk, sk) = sphincs_shake_128s::KG::try_keygen_with_rng(&mut rng).unwrap();
    let msg = b"stateless hash-based signatures";

    let signed = sk.try_sign(msg).unwrap();
    assert_eq!(signed.len(), sphincs_shake_128s::SIG_LEN + msg.len());
    assert_eq!(vk.try_open(&signed).unwrap(), msg);
}


#[test]
fn test_published_sizes() {
    assert_eq!(dilithium_iii::VK_LEN, 1472);
    assert_eq!(dilithium_iii::SK_LEN, 3504);
    assert_eq!(dilithium_iii::SIG_LEN, 2701);

    assert_eq!(kyber_768::EK_LEN, 1184);
    assert_eq!(kyber_768::DK_LEN, 2400);
    assert_eq!(kyber_768::CT_LEN, 1088);

    assert_eq!(ntru_s3::EK_LEN, 1218);
    assert_eq!(ntru_s3::DK_LEN, 1600);
    assert_eq!(ntru_s3::CT_LEN, 1047);

    assert_eq!(mceliece_6960_119::EK_LEN, 1_047_319);
    assert_eq!(mceliece_6960_119::DK_LEN, 13_908);
    assert_eq!(mceliece_6960_119::CT_LEN, 226);

    assert_eq!(pqcore::mceliece_8192_128::EK_LEN, 1_357_824);
    assert_eq!(pqcore::mceliece_8192_128::DK_LEN, 14_080);
    assert_eq!(pqcore::mceliece_8192_128::CT_LEN, 240);

    assert_eq!(sphincs_shake_128s::VK_LEN, 32);
    assert_eq!(sphincs_shake_128s::SK_LEN, 64);
    assert_eq!(sphincs_shake_128s::SIG_LEN, 8080);
    assert_eq!(pqcore::sphincs_shake_192s::SIG_LEN, 17_064);
    assert_eq!(pqcore::sphincs_shake_256s::SIG_LEN, 29_792);
}


// $ cargo test -- --ignored
#[ignore]
#[test]
fn test_forever_kyber() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    for i in 0..u64::MAX {
        let (ek, dk) = kyber_768::KG::try_keygen_with_rng(&mut rng).unwrap();
        let (ssk1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
        let ssk2 = dk.try_decaps(&ct).unwrap();
        assert_eq!(ssk1, ssk2, "shared secret failed on iteration {i}");
    }
}
