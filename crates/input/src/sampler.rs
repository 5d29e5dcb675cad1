use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::keys;

/// Live key state shared between the sampler and its handles.
#[derive(Debug, Default)]
struct KeyTable {
    /// Live [`Attachment`] guards of the current generation.
    attachments: usize,
    /// Bumped by a forced detach so guards handed out earlier become inert.
    generation: u64,
    physical: BTreeSet<String>,
    virtual_keys: BTreeSet<String>,
}

impl KeyTable {
    fn attached(&self) -> bool {
        self.attachments > 0
    }

    fn set(&mut self, layer: Layer, code: &str, pressed: bool) {
        let set = match layer {
            Layer::Physical => &mut self.physical,
            Layer::Virtual => &mut self.virtual_keys,
        };
        if pressed {
            set.insert(code.to_string());
        } else {
            set.remove(code);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Layer {
    Physical,
    Virtual,
}

/// What the host should do with a platform key event after the sampler saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Sampler is detached; the event was not recorded.
    Ignored,
    /// Recorded; let the platform handle it normally.
    Recorded,
    /// Recorded; the platform default (scrolling) must be prevented.
    SuppressDefault,
}

/// Polls key state and hands out one snapshot per frame.
///
/// Physical events are fed through [`InputSampler::key_event`] by the host
/// window while attached. Touch widgets inject keys through an
/// [`InputHandle`], which is a weak capability: once the sampler is gone the
/// handle silently does nothing.
#[derive(Debug, Default)]
pub struct InputSampler {
    table: Rc<RefCell<KeyTable>>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening. Guards are counted: the sampler stays attached
    /// until every guard from this call and earlier ones is dropped.
    pub fn attach(&self) -> Attachment {
        let mut table = self.table.borrow_mut();
        if !table.attached() {
            tracing::debug!("input sampler attached");
        }
        table.attachments += 1;
        Attachment {
            table: Rc::downgrade(&self.table),
            generation: table.generation,
        }
    }

    /// Stop listening now regardless of outstanding guards, and release all
    /// held keys. Guards issued before this call no longer count.
    pub fn detach(&self) {
        let mut table = self.table.borrow_mut();
        if table.attached() {
            tracing::debug!("input sampler detached");
        }
        table.generation += 1;
        table.attachments = 0;
        release(&mut table);
    }

    /// Drop every held key but stay attached, e.g. when the window loses
    /// focus and release events will never arrive.
    pub fn release_all(&self) {
        release(&mut self.table.borrow_mut());
    }

    pub fn is_attached(&self) -> bool {
        self.table.borrow().attached()
    }

    /// Physical key down/up from the host window.
    pub fn key_event(&self, code: &str, pressed: bool) -> EventDisposition {
        let mut table = self.table.borrow_mut();
        if !table.attached() {
            return EventDisposition::Ignored;
        }
        table.set(Layer::Physical, code, pressed);
        if pressed && keys::is_suppressed(code) {
            EventDisposition::SuppressDefault
        } else {
            EventDisposition::Recorded
        }
    }

    /// Press or release a synthetic key. Returns `false` while detached.
    pub fn set_virtual(&self, code: &str, pressed: bool) -> bool {
        set_virtual(&self.table, code, pressed)
    }

    /// Copy of the current key state.
    pub fn snapshot(&self) -> KeySnapshot {
        let table = self.table.borrow();
        let pressed = table
            .physical
            .union(&table.virtual_keys)
            .cloned()
            .collect();
        KeySnapshot { pressed }
    }

    /// Capability object for touch controls.
    pub fn handle(&self) -> InputHandle {
        InputHandle {
            table: Rc::downgrade(&self.table),
        }
    }
}

impl Drop for InputSampler {
    fn drop(&mut self) {
        self.detach();
    }
}

fn release(table: &mut KeyTable) {
    table.physical.clear();
    table.virtual_keys.clear();
}

fn set_virtual(table: &Rc<RefCell<KeyTable>>, code: &str, pressed: bool) -> bool {
    let mut table = table.borrow_mut();
    if !table.attached() {
        return false;
    }
    table.set(Layer::Virtual, code, pressed);
    true
}

/// Scoped listener registration. Dropping the last live guard detaches the
/// sampler.
#[derive(Debug)]
pub struct Attachment {
    table: Weak<RefCell<KeyTable>>,
    generation: u64,
}

impl Attachment {
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let mut table = table.borrow_mut();
        if table.generation != self.generation || table.attachments == 0 {
            return;
        }
        table.attachments -= 1;
        if table.attachments == 0 {
            tracing::debug!("input sampler detached");
            release(&mut table);
        }
    }
}

/// Weak set-virtual-key capability handed to touch widgets.
#[derive(Debug, Clone)]
pub struct InputHandle {
    table: Weak<RefCell<KeyTable>>,
}

impl InputHandle {
    /// Returns `false` when the sampler is detached or gone.
    pub fn set_virtual(&self, code: &str, pressed: bool) -> bool {
        match self.table.upgrade() {
            Some(table) => set_virtual(&table, code, pressed),
            None => false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|t| t.borrow().attached())
    }
}

/// Pressed keys at one instant. Mutating it never affects live input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pressed: BTreeSet<String>,
}

impl KeySnapshot {
    pub fn from_keys<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            pressed: codes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_down(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    pub fn any_down(&self, codes: &[&str]) -> bool {
        codes.iter().any(|c| self.is_down(c))
    }

    /// Take a key out of this snapshot. Returns whether it was down.
    pub fn consume(&mut self, code: &str) -> bool {
        self.pressed.remove(code)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pressed.iter().map(String::as_str)
    }
}
