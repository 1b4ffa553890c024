use std::{collections::HashMap, rc::Rc};

use crate::{Arg, CallResult, Frame};

/// A resolved owner method: receives the live owner, the captured arguments,
/// and the frame it runs in.
pub type Method<O> = Rc<dyn Fn(&mut O, &[Arg], &mut Frame<O>) -> CallResult>;

/// Looks up a callable member by name on an owner.
///
/// The scheduler never inspects owners itself. Bound registrations by name go
/// through the resolver it was built with; returning `None` rejects the
/// registration.
pub trait Resolve<O> {
    fn resolve(&self, owner: &O, member: &str) -> Option<Method<O>>;
}

impl<O, F> Resolve<O> for F
where
    F: Fn(&O, &str) -> Option<Method<O>>,
{
    fn resolve(&self, owner: &O, member: &str) -> Option<Method<O>> {
        self(owner, member)
    }
}

/// Name → method table shared by every owner of one type.
pub struct MethodTable<O> {
    methods: HashMap<String, Method<O>>,
}

impl<O> Default for MethodTable<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> MethodTable<O> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    pub fn with<F>(mut self, member: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut O, &[Arg], &mut Frame<O>) -> CallResult + 'static,
    {
        self.insert(member, method);
        self
    }

    /// Replaces any method already registered under `member`.
    pub fn insert<F>(&mut self, member: impl Into<String>, method: F)
    where
        F: Fn(&mut O, &[Arg], &mut Frame<O>) -> CallResult + 'static,
    {
        self.methods.insert(member.into(), Rc::new(method));
    }

    pub fn contains(&self, member: &str) -> bool {
        self.methods.contains_key(member)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<O> Resolve<O> for MethodTable<O> {
    fn resolve(&self, _owner: &O, member: &str) -> Option<Method<O>> {
        self.methods.get(member).cloned()
    }
}

/// `"Type.member"`, without the module path or generic arguments.
pub(crate) fn member_label<O>(member: &str) -> String {
    format!("{}.{member}", short_type_name::<O>())
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
