//! Resources that record how often they were dropped.

use alloc::rc::Rc;
use core::cell::Cell;

/// Number of drops observed, shared between a test and its resources.
#[derive(Clone, Default)]
pub struct Drops(Rc<Cell<usize>>);

impl Drops
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn get(&self) -> usize
    {
        self.0.get()
    }

    pub fn record(&self)
    {
        self.0.set(self.0.get() + 1);
    }

    pub fn resource(&self, value: i32) -> Tracked
    {
        Tracked{value, drops: self.clone()}
    }
}

/// Resource that bumps its [`Drops`] when dropped.
#[derive(Debug)]
pub struct Tracked
{
    pub value: i32,
    drops: Drops,
}

impl Drop for Tracked
{
    fn drop(&mut self)
    {
        self.drops.record();
    }
}

impl core::fmt::Debug for Drops
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        write!(f, "Drops({})", self.get())
    }
}
