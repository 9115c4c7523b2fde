use ringex::{Publisher, RingConfig, RingStorage, Sequence, Sequencer};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const MSG_PER_PRODUCER: u64 = 50_000_000;
const BATCH_SIZE: i64 = 32_768;

fn benchmark_config(num_producers: usize) {
    println!("\n{num_producers} Producer(s) x 1 Consumer");
    println!("{}", "=".repeat(50));

    let config = RingConfig::new(1 << 16)
        .unwrap()
        .with_producer_kind(if num_producers == 1 {
            ringex::ProducerKind::Single
        } else {
            ringex::ProducerKind::Multi
        });
    let storage = Arc::new(RingStorage::new(config.capacity(), || 0u32));
    let sequencer = Arc::new(Sequencer::new(&config));
    let publisher = Arc::new(Publisher::new(storage, sequencer));
    let consumed = Arc::new(Sequence::new());
    publisher
        .add_gating_sequences(vec![consumed.clone()])
        .unwrap();

    let start = Instant::now();

    let mut handles = vec![];
    for _ in 0..num_producers {
        let publisher = publisher.clone();
        let handle = thread::spawn(move || {
            let mut sent = 0u64;
            while sent < MSG_PER_PRODUCER {
                let want = BATCH_SIZE.min((MSG_PER_PRODUCER - sent) as i64);
                publisher
                    .publish_events(want, move |s, slot: &mut u32| *slot = s as u32)
                    .unwrap();
                sent += want as u64;
            }
        });
        handles.push(handle);
    }

    let target = (num_producers as u64) * MSG_PER_PRODUCER;
    let consumer_publisher = publisher.clone();
    let consumer_consumed = consumed.clone();
    let consumer_handle = thread::spawn(move || {
        let barrier = consumer_publisher.sequencer().new_barrier(vec![]);
        let mut next_to_read = 0i64;
        let mut total = 0u64;

        while total < target {
            let available = barrier.wait_for(next_to_read).unwrap();
            total += (available - next_to_read + 1) as u64;
            next_to_read = available + 1;
            consumer_consumed.set(available);
        }
        total
    });

    for handle in handles {
        handle.join().unwrap();
    }
    let total = consumer_handle.join().unwrap();
    let duration = start.elapsed();

    let total_messages = (num_producers as u64) * MSG_PER_PRODUCER;
    let throughput = total_messages as f64 / duration.as_secs_f64();
    let per_producer = throughput / num_producers as f64;

    println!("  Total messages:    {total_messages}");
    println!("  Duration:          {duration:.2?}");
    println!(
        "  Total throughput:  {:.2} M/s",
        throughput / 1_000_000.0
    );
    println!("  Per producer:      {:.2} M/s", per_producer / 1_000_000.0);
    println!("  Messages consumed: {total}");
}

fn main() {
    println!("\nringex Scaling Benchmark");
    println!("========================");
    println!("Messages per producer: {MSG_PER_PRODUCER}");
    println!("Batch size: {BATCH_SIZE}");
    println!("Ring capacity: 65536 slots");

    for num_producers in [1, 2, 4, 6, 8] {
        benchmark_config(num_producers);
    }

    println!("\n{}", "=".repeat(50));
    println!("Benchmark complete!");
}
