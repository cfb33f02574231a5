//! # Example: pipeline
//!
//! End-to-end walk through the pipeline with the built-in [`LogWriter`]:
//! create tasks, admit them, watch phase advances, delete one mid-flight,
//! then drain within a deadline.
//!
//! ## Flow
//! ```text
//! create_task ──► StatusStore (pending)
//! admit ────────► AdmissionQueue ──► workers
//!                     ├─► phase 1 → sleep → phase 2 → sleep → phase 3
//!                     └─► events on the bus → LogWriter
//! shutdown ─────► drain within 2s
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pipeline --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use phasepool::{LogWriter, PoolConfig, Subscribe, TaskPool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Short phase delays so the demo finishes in a few seconds
    let cfg = PoolConfig {
        workers: 3,
        phase_delay_min: Duration::from_millis(200),
        phase_delay_max: Duration::from_millis(400),
        ..PoolConfig::default()
    };

    // 2. Print every event to stdout
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    // 3. Build and start the pool
    let pool = TaskPool::builder(cfg).with_subscribers(subs).build();
    pool.start()?;

    // 4. Create and admit a handful of tasks
    let mut ids = Vec::new();
    for n in 0..5 {
        let id = pool.create_task(&format!("report-{n}"))?;
        pool.admit(&id)?;
        ids.push(id);
    }

    // 5. Delete one mid-flight: its worker abandons the remaining phases
    tokio::time::sleep(Duration::from_millis(300)).await;
    pool.delete_task(&ids[0])?;

    // 6. Let the rest finish, then show their final status
    tokio::time::sleep(Duration::from_secs(2)).await;
    for id in &ids[1..] {
        if let Ok(snap) = pool.task_status(id) {
            println!(
                "status: name={} phase={:?} created={} elapsed={}",
                snap.name, snap.phase, snap.created_at_formatted, snap.elapsed
            );
        }
    }

    // 7. Drain: everything is idle by now, so this reports a clean drain
    pool.shutdown_within(Duration::from_secs(2)).await?;
    println!("drained");
    Ok(())
}
