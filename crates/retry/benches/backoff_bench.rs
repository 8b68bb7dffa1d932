use criterion::{Criterion, black_box, criterion_group, criterion_main};
use retry::RetryPolicy;

fn backoff_benchmark(c: &mut Criterion) {
  let policy = RetryPolicy::default();
  c.bench_function("delay_for_attempt", |b| {
    b.iter(|| {
      for attempt in 1..policy.max_tries {
        black_box(policy.delay_for_attempt(black_box(attempt)));
      }
    })
  });
}

criterion_group!(benches, backoff_benchmark);
criterion_main!(benches);
