//! Replays the full storage lifecycle against one 1024-byte buffer:
//! shared reads, the exclusive write, every rejection along the way, and
//! the terminal hand-off.

use anyhow::Result;
use lockbuf::{AccessMode, Blocker, LockError, LockState, LockedBuffer};

const CAPACITY: usize = 1024;

#[test]
fn storage_lifecycle_walkthrough() -> Result<()> {
    let mut locked = LockedBuffer::new(CAPACITY)?;
    assert_eq!(locked.byte_len(), CAPACITY);

    // A read view is granted and blocks the writer.
    let mut read = locked.read()?;
    assert!(read.is_live());
    assert_eq!(read.byte_len(), CAPACITY);
    assert!(matches!(
        locked.write(),
        Err(LockError::Acquire {
            mode: AccessMode::Write,
            blocked: Blocker::Readers { count: 1 },
        })
    ));

    let payout = locked.unlock(&mut read)?;
    assert_eq!(payout.len(), CAPACITY);
    assert!(!read.is_live());

    // The write view is exclusive against every other operation.
    let mut write = locked.write()?;
    assert_eq!(write.byte_len(), CAPACITY);
    assert_eq!(write.mode(), AccessMode::Write);
    assert!(matches!(
        locked.write(),
        Err(LockError::Acquire {
            mode: AccessMode::Write,
            blocked: Blocker::Writer,
        })
    ));
    assert!(matches!(
        locked.read(),
        Err(LockError::Acquire {
            mode: AccessMode::Read,
            blocked: Blocker::Writer,
        })
    ));
    assert!(matches!(
        locked.transfer(),
        Err(LockError::Transfer {
            blocked: Blocker::Writer,
        })
    ));

    locked.unlock(&mut write)?;

    // Two concurrent readers share access and both block the hand-off.
    let mut read = locked.read()?;
    let mut read2 = locked.read()?;
    assert_eq!(read.byte_len(), CAPACITY);
    assert_eq!(read2.byte_len(), CAPACITY);
    assert_ne!(read.id(), read2.id());
    assert_eq!(locked.state(), LockState::Reading { readers: 2 });
    assert!(matches!(
        locked.transfer(),
        Err(LockError::Transfer {
            blocked: Blocker::Readers { count: 2 },
        })
    ));

    locked.unlock(&mut read)?;
    assert!(matches!(
        locked.write(),
        Err(LockError::Acquire {
            mode: AccessMode::Write,
            blocked: Blocker::Readers { count: 1 },
        })
    ));

    locked.unlock(&mut read2)?;

    // With zero views outstanding the storage moves out for good, and the
    // new owner holds it exclusively, mutation included.
    let mut storage = locked.transfer()?;
    assert_eq!(storage.len(), CAPACITY);
    storage.as_mut_slice()[..4].copy_from_slice(b"ours");
    assert_eq!(&storage.as_slice()[..4], b"ours");
    assert!(locked.transferred());
    assert_eq!(locked.state(), LockState::Transferred);
    assert_eq!(locked.byte_len(), 0);

    assert!(matches!(locked.read(), Err(LockError::AlreadyTransferred)));
    assert!(matches!(locked.write(), Err(LockError::AlreadyTransferred)));

    // The terminal query stays true and never disturbs anything.
    assert!(locked.transferred());
    assert!(locked.transferred());

    Ok(())
}
