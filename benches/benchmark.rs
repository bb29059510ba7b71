use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::thread_rng;

use ark_ff::UniformRand;
use bgw_sharing::prss::PrssSetup;
use bgw_sharing::shamir::ShamirSharer;

type F = ark_bls12_381::Fr;

fn bench_share(c: &mut Criterion) {
    let sharer = ShamirSharer::<F>::new(31, 10).unwrap();
    let mut rng = thread_rng();
    let secret = F::rand(&mut rng);
    c.bench_function("shamir share n=31 t=10", |b| {
        b.iter(|| black_box(sharer.share(&secret, &mut rng)))
    });
}

fn bench_recover(c: &mut Criterion) {
    let sharer = ShamirSharer::<F>::new(31, 10).unwrap();
    let mut rng = thread_rng();
    let secret = F::rand(&mut rng);
    let shares = sharer.share(&secret, &mut rng);
    c.bench_function("shamir recover n=31 t=10", |b| {
        b.iter(|| black_box(sharer.recover(&shares[..11]).unwrap()))
    });
    c.bench_function("shamir recover checked n=31 t=10", |b| {
        b.iter(|| black_box(sharer.recover_checked(&shares).unwrap()))
    });
}

fn bench_prss_random(c: &mut Criterion) {
    let mut rng = thread_rng();
    let setup = PrssSetup::<F>::deal(10, 3, &mut rng).unwrap();
    let mut node = setup.pseudo_node(1).unwrap();
    c.bench_function("prss random share n=10 t=3 batch=32", |b| {
        b.iter(|| black_box(node.next_random_share(32).unwrap()))
    });
}

fn bench_prss_zero(c: &mut Criterion) {
    let mut rng = thread_rng();
    let setup = PrssSetup::<F>::deal(10, 3, &mut rng).unwrap();
    let mut node = setup.pseudo_node(1).unwrap();
    c.bench_function("prss zero share n=10 t=3 batch=32", |b| {
        b.iter(|| black_box(node.next_zero_share(32).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_share,
    bench_recover,
    bench_prss_random,
    bench_prss_zero
);
criterion_main!(benches);
