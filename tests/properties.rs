use proptest::prelude::*;
use qkd_bb84::protocols::bb84::estimation::estimate_errors;
use qkd_bb84::protocols::bb84::sifting::sift;
use qkd_bb84::protocols::bb84::distillation::distill;
use qkd_bb84::{Basis, IdealChannel, QuantumChannel, SimulatedChannel, encode, run_seeded};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn arb_basis() -> impl Strategy<Value = Basis> {
    prop_oneof![Just(Basis::Rectilinear), Just(Basis::Diagonal)]
}

prop_compose! {
    fn arb_records(max: usize)(n in 1..max)(
        alice_bases in proptest::collection::vec(arb_basis(), n),
        bob_bases in proptest::collection::vec(arb_basis(), n),
        alice_bits in proptest::collection::vec(any::<bool>(), n),
        bob_bits in proptest::collection::vec(any::<bool>(), n),
    ) -> (Vec<Basis>, Vec<Basis>, Vec<bool>, Vec<bool>) {
        (alice_bases, bob_bases, alice_bits, bob_bits)
    }
}

proptest! {
    #[test]
    fn measuring_in_preparation_basis_returns_the_bit(bit in any::<bool>(), basis in arb_basis(), seed in any::<u64>()) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);

        let ideal = IdealChannel::new();
        let state = ideal.prepare(encode(bit, basis)).unwrap();
        prop_assert_eq!(ideal.measure(state, basis, &mut rng).unwrap(), bit);

        let simulated = SimulatedChannel::new();
        let state = simulated.prepare(encode(bit, basis)).unwrap();
        prop_assert_eq!(simulated.measure(state, basis, &mut rng).unwrap(), bit);
    }

    #[test]
    fn sifting_keeps_exactly_the_agreeing_positions((ab, bb, abits, bbits) in arb_records(128)) {
        let key = sift(&ab, &bb, &abits, &bbits);

        prop_assert!(key.len() <= ab.len());
        let expected: Vec<usize> = (0..ab.len()).filter(|&i| ab[i] == bb[i]).collect();
        prop_assert_eq!(&key.agreement, &expected);
        for (k, &i) in key.agreement.iter().enumerate() {
            prop_assert_eq!(key.alice_bits[k], abits[i]);
            prop_assert_eq!(key.bob_bits[k], bbits[i]);
        }
    }

    #[test]
    fn sample_and_key_partition_the_sifted_bits((ab, bb, abits, bbits) in arb_records(128), seed in any::<u64>()) {
        let key = sift(&ab, &bb, &abits, &bbits);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let estimate = estimate_errors(&key, &mut rng);

        prop_assert_eq!(estimate.sample_size(), key.len() / 2);
        prop_assert!(estimate.sample.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(estimate.sample.iter().all(|&i| i < key.len()));
        prop_assert!(estimate.error_rate >= 0.0 && estimate.error_rate <= 1.0);
        prop_assert_eq!(distill(&key, &estimate).len(), key.len() - estimate.sample_size());
    }

    #[test]
    fn seeded_runs_are_reproducible(n in 16usize..=256, eavesdrop in any::<bool>(), seed in any::<u64>()) {
        let a = run_seeded(n, eavesdrop, seed).unwrap();
        let b = run_seeded(n, eavesdrop, seed).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.is_success() || a.key.is_empty());
    }
}
