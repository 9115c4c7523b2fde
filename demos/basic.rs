use ringex::{Publisher, RingConfig, RingStorage, Sequence, Sequencer};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("ringex Basic Example");
    println!("=====================\n");

    const N_PRODUCERS: usize = 4;
    const ITEMS_PER_PRODUCER: usize = 1_000_000;

    let config = RingConfig::new(1 << 16)
        .unwrap()
        .with_producer_kind(ringex::ProducerKind::Multi);
    let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
    let sequencer = Arc::new(Sequencer::new(&config));
    let publisher = Arc::new(Publisher::new(storage, sequencer));

    let consumed = Arc::new(Sequence::new());
    publisher
        .add_gating_sequences(vec![consumed.clone()])
        .unwrap();

    println!("Configuration:");
    println!("  Producers: {N_PRODUCERS}");
    println!("  Items per producer: {ITEMS_PER_PRODUCER}");
    println!("  Total items: {}\n", N_PRODUCERS * ITEMS_PER_PRODUCER);

    let start = Instant::now();

    let mut handles = vec![];
    for id in 0..N_PRODUCERS {
        let publisher = publisher.clone();
        let handle = thread::spawn(move || {
            for i in 0..ITEMS_PER_PRODUCER {
                let value = (id * ITEMS_PER_PRODUCER + i) as u64;
                publisher
                    .publish_event(move |_seq, slot: &mut u64| *slot = value)
                    .unwrap();
            }
            println!("Producer {id} finished");
        });
        handles.push(handle);
    }

    let total_items = (N_PRODUCERS * ITEMS_PER_PRODUCER) as i64;
    let consumer_publisher = publisher.clone();
    let consumer_consumed = consumed.clone();
    let consumer_handle = thread::spawn(move || {
        let barrier = consumer_publisher.sequencer().new_barrier(vec![]);
        let mut next_to_read = 0i64;
        let mut sum = 0u64;

        while next_to_read < total_items {
            let available = barrier.wait_for(next_to_read).unwrap();
            for seq in next_to_read..=available {
                sum += unsafe { *consumer_publisher.get(seq) };
            }
            next_to_read = available + 1;
            consumer_consumed.set(available);
        }

        (next_to_read, sum)
    });

    for handle in handles {
        handle.join().unwrap();
    }

    let (total, sum) = consumer_handle.join().unwrap();
    let duration = start.elapsed();

    println!("\nResults:");
    println!("  Items consumed: {total}");
    println!("  Sum: {sum}");
    println!("  Duration: {duration:.2?}");
    println!(
        "  Throughput: {:.2} million items/sec",
        total as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}
