//! Runtime teardown drains the process-wide orphan registry, so this file
//! holds a single test and runs in its own process.

mod common;

use common::{DropProbe, SimTimers, Trigger};
use sequel::{RuntimeBuilder, is_orphaned, launch, orphan_count};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_shutdown_destroys_orphans() {
    let runtime = RuntimeBuilder::new().orphan_warning(2).build();

    let timers = SimTimers::new();
    let trigger = Trigger::<u8>::new();
    let drops = Arc::new(AtomicUsize::new(0));
    let resumed = Arc::new(AtomicUsize::new(0));

    let waiting = {
        let timers = timers.clone();
        let probe = DropProbe::new(&drops);
        let resumed = resumed.clone();

        launch(async move {
            timers.sleep(5).await?;
            resumed.fetch_add(1, Ordering::SeqCst);
            drop(probe);
            Ok(())
        })
    };

    let finishing = {
        let trigger = trigger.clone();
        let probe = DropProbe::new(&drops);

        launch(async move {
            let value = trigger.wait().await?;
            drop(probe);
            Ok(value)
        })
    };

    let waiting_id = waiting.id().unwrap();
    let finishing_id = finishing.id().unwrap();

    drop(waiting);
    drop(finishing);

    assert_eq!(orphan_count(), 2);
    assert_eq!(runtime.orphans(), 2);

    // Completed orphans stay retained until shutdown.
    assert!(trigger.fire(1));
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(is_orphaned(finishing_id));

    assert_eq!(runtime.shutdown(), 2);

    assert_eq!(orphan_count(), 0);
    assert!(!is_orphaned(waiting_id));
    assert_eq!(drops.load(Ordering::SeqCst), 2, "Unfinished orphan destroyed");

    // The timer still holds a resolver for the destroyed frame.
    assert_eq!(timers.advance(5), 1);
    assert_eq!(resumed.load(Ordering::SeqCst), 0, "Late resolve must be ignored");

    // Discarding after teardown destroys the frame immediately.
    let late = {
        let probe = DropProbe::new(&drops);
        let trigger = trigger.clone();

        launch(async move {
            trigger.wait().await?;
            drop(probe);
            Ok(())
        })
    };

    drop(late);

    assert_eq!(orphan_count(), 0);
    assert_eq!(drops.load(Ordering::SeqCst), 3);

    // Its resolver is still out there; firing it is a no-op.
    assert!(trigger.fire(0));
    assert_eq!(drops.load(Ordering::SeqCst), 3);
}
