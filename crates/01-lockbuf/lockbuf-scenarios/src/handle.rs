use lockbuf::{LockResult, LockState, LockedBuffer, Region, SharedView};
use lockbuf_sync::BufferHandle;

/// Buffer operations a scenario engine drives, implemented for the bare
/// state machine and for the serialized shared handle.
pub trait LockHandle: Send {
    fn read(&mut self) -> LockResult<SharedView>;
    fn write(&mut self) -> LockResult<SharedView>;
    fn unlock(&mut self, view: &mut SharedView) -> LockResult<Region>;
    fn transfer(&mut self) -> LockResult<Region>;
    fn state(&self) -> LockState;
    fn transferred(&self) -> bool;
    fn byte_len(&self) -> usize;
}

impl LockHandle for LockedBuffer {
    fn read(&mut self) -> LockResult<SharedView> {
        LockedBuffer::read(self)
    }

    fn write(&mut self) -> LockResult<SharedView> {
        LockedBuffer::write(self)
    }

    fn unlock(&mut self, view: &mut SharedView) -> LockResult<Region> {
        LockedBuffer::unlock(self, view)
    }

    fn transfer(&mut self) -> LockResult<Region> {
        LockedBuffer::transfer(self)
    }

    fn state(&self) -> LockState {
        LockedBuffer::state(self)
    }

    fn transferred(&self) -> bool {
        LockedBuffer::transferred(self)
    }

    fn byte_len(&self) -> usize {
        LockedBuffer::byte_len(self)
    }
}

impl LockHandle for BufferHandle {
    fn read(&mut self) -> LockResult<SharedView> {
        BufferHandle::read(self)
    }

    fn write(&mut self) -> LockResult<SharedView> {
        BufferHandle::write(self)
    }

    fn unlock(&mut self, view: &mut SharedView) -> LockResult<Region> {
        BufferHandle::unlock(self, view)
    }

    fn transfer(&mut self) -> LockResult<Region> {
        BufferHandle::transfer(self)
    }

    fn state(&self) -> LockState {
        BufferHandle::state(self)
    }

    fn transferred(&self) -> bool {
        BufferHandle::transferred(self)
    }

    fn byte_len(&self) -> usize {
        BufferHandle::byte_len(self)
    }
}

impl<H: LockHandle> LockHandle for &mut H {
    fn read(&mut self) -> LockResult<SharedView> {
        (**self).read()
    }

    fn write(&mut self) -> LockResult<SharedView> {
        (**self).write()
    }

    fn unlock(&mut self, view: &mut SharedView) -> LockResult<Region> {
        (**self).unlock(view)
    }

    fn transfer(&mut self) -> LockResult<Region> {
        (**self).transfer()
    }

    fn state(&self) -> LockState {
        (**self).state()
    }

    fn transferred(&self) -> bool {
        (**self).transferred()
    }

    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}
