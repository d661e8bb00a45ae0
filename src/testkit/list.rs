//! A string list contract with its proxy and a real implementation.
//!
//! [`StringList`] is the interface the usage scenarios mock. [`ListProxy`]
//! is its proxy, usable both as a mock and as a spy over any real
//! `StringList`. [`VecList`] is a plain `Vec` behind a lock, there only to
//! give spies something real to delegate to.

use crate::capability::CapabilitySet;
use crate::proxy::{AsMock, Proxy, Spyable};
use crate::session::MockHandle;
use crate::value::{FromValue, ReturnKind, Value};
use crate::values;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait StringList: Send + Sync {
    fn add(&self, item: &str) -> bool;
    fn get(&self, index: usize) -> Option<String>;
    /// Replace the item at `index`, returning the previous one.
    fn set(&self, index: usize, item: &str) -> Option<String>;
    fn size(&self) -> usize;
    fn clear(&self);
    fn contains(&self, item: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct VecList {
    items: Mutex<Vec<String>>,
}

impl VecList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn StringList> {
        Arc::new(Self::new())
    }
}

impl StringList for VecList {
    fn add(&self, item: &str) -> bool {
        self.items.lock().push(item.to_string());
        true
    }

    fn get(&self, index: usize) -> Option<String> {
        self.items.lock().get(index).cloned()
    }

    fn set(&self, index: usize, item: &str) -> Option<String> {
        self.items
            .lock()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, item.to_string()))
    }

    fn size(&self) -> usize {
        self.items.lock().len()
    }

    fn clear(&self) {
        self.items.lock().clear();
    }

    fn contains(&self, item: &str) -> bool {
        self.items.lock().iter().any(|i| i == item)
    }
}

/// Proxy for [`StringList`]; a spy when it wraps a real list.
pub struct ListProxy {
    handle: MockHandle,
    real: Option<Arc<dyn StringList>>,
}

impl ListProxy {
    fn dispatch<R: FromValue>(
        &self,
        member: &str,
        args: Vec<Value>,
        real: impl FnOnce(&dyn StringList) -> R,
    ) -> R {
        match &self.real {
            Some(list) => self.handle.call_real_or(member, args, || real(list.as_ref())),
            None => self.handle.call(member, args),
        }
    }
}

impl AsMock for ListProxy {
    fn mock_handle(&self) -> &MockHandle {
        &self.handle
    }
}

impl Proxy for ListProxy {
    fn capability() -> CapabilitySet {
        CapabilitySet::new("List")
            .method("add", 1, ReturnKind::Bool)
            .method("get", 1, ReturnKind::Object)
            .method("set", 2, ReturnKind::Object)
            .method("size", 0, ReturnKind::Int)
            .method("clear", 0, ReturnKind::Unit)
            .method("contains", 1, ReturnKind::Bool)
    }

    fn from_handle(handle: MockHandle) -> Self {
        Self { handle, real: None }
    }
}

impl Spyable for ListProxy {
    type Real = Arc<dyn StringList>;

    fn wrap_real(handle: MockHandle, real: Self::Real) -> Self {
        Self {
            handle,
            real: Some(real),
        }
    }
}

impl StringList for ListProxy {
    fn add(&self, item: &str) -> bool {
        self.dispatch("add", values![item], |real| real.add(item))
    }

    fn get(&self, index: usize) -> Option<String> {
        self.dispatch("get", values![index], |real| real.get(index))
    }

    fn set(&self, index: usize, item: &str) -> Option<String> {
        self.dispatch("set", values![index, item], |real| real.set(index, item))
    }

    fn size(&self) -> usize {
        self.dispatch("size", values![], |real| real.size())
    }

    fn clear(&self) {
        self.dispatch("clear", values![], |real| real.clear())
    }

    fn contains(&self, item: &str) -> bool {
        self.dispatch("contains", values![item], |real| real.contains(item))
    }
}
