use stress_test::{stress_test_key_reconciler, stress_test_scaling, stress_test_undo_session};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    let passed = rt.block_on(async_main());
    if !passed {
        std::process::exit(1);
    }
}

async fn async_main() -> bool {
    let mut passed = true;

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            ASYNC STRESS TESTS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: short sequences
    let stats = stress_test_key_reconciler(7, 2000, 32).await;
    stats.print();
    passed &= stats.passed();

    // Test 2: long sequences
    let stats = stress_test_key_reconciler(42, 500, 512).await;
    stats.print();
    passed &= stats.passed();

    // Test 3: shared session with small scale
    let stats = stress_test_undo_session(4, 100).await;
    stats.print();
    passed &= stats.passed();

    // Test 4: shared session with medium scale
    let stats = stress_test_undo_session(16, 250).await;
    stats.print();
    passed &= stats.passed();

    // Test 5: Scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS (Key Reconciler)                 ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(512, 128).await;

    if passed {
        println!("\n✓ All stress tests completed successfully!");
    } else {
        println!("\n✗ Some stress tests reported failures");
    }
    passed
}
