//! Process-wide cache of validation results and node trees, keyed by record type.
//!
//! Each record type is validated at most once per process (barring a benign race where two
//! threads validate the same type concurrently and the first result to be stored wins). Failed
//! validations are cached as well, so a rejected type is rejected with the same error on every
//! call.

use crate::{
    error::Error,
    node::CompositeNode,
    schema::{Record, RecordSchema},
    validate::validate,
};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};
use tracing::{debug, trace, warn};

#[derive(Default)]
struct Registry {
    validated: RwLock<HashMap<TypeId, Result<(), Error>>>,
    roots: RwLock<HashMap<TypeId, Arc<CompositeNode>>>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::default);

impl Registry {
    fn check<R: Record>(&self) -> Result<(), Error> {
        let id = TypeId::of::<R>();
        if let Some(result) = self
            .validated
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return result.clone();
        }

        // Validate outside the lock
        let schema = RecordSchema::of::<R>();
        let result = validate(&schema);
        match &result {
            Ok(()) => debug!(record = schema.name(), "validated schema"),
            Err(err) => warn!(record = schema.name(), ?err, "rejected schema"),
        }
        self.validated
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(result)
            .clone()
    }

    fn root<R: Record>(&self) -> Result<Arc<CompositeNode>, Error> {
        let id = TypeId::of::<R>();
        if let Some(root) = self
            .roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            trace!(record = root.record(), "node tree cache hit");
            return Ok(root.clone());
        }

        self.check::<R>()?;
        let root = Arc::new(CompositeNode::build(&RecordSchema::of::<R>(), true)?);
        debug!(record = root.record(), "published node tree");
        Ok(self
            .roots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(root)
            .clone())
    }
}

/// Validates `R`, reusing the cached result if `R` was seen before.
pub(crate) fn check<R: Record>() -> Result<(), Error> {
    REGISTRY.check::<R>()
}

/// Returns the node tree of `R`, validating and building it on first use.
pub(crate) fn root<R: Record>() -> Result<Arc<CompositeNode>, Error> {
    REGISTRY.root::<R>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Location, Violation},
        record,
    };
    use std::thread;

    record! {
        #[derive(Default)]
        struct Cached {
            #[field(order = 0)]
            id: u32,
        }
    }

    record! {
        #[derive(Default)]
        struct Rejected {
            #[field(order = 1)]
            id: u32,
        }
    }

    #[test]
    fn test_root_cached() {
        let first = root::<Cached>().unwrap();
        let second = root::<Cached>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.record(), "Cached");
    }

    #[test]
    fn test_rejection_cached() {
        let expected = Error::Schema(
            Location::field("Rejected", "id"),
            Violation::NonSequentialOrder {
                order: 1,
                position: 0,
            },
        );
        assert_eq!(check::<Rejected>(), Err(expected.clone()));
        assert_eq!(check::<Rejected>(), Err(expected.clone()));
        assert_eq!(root::<Rejected>().err(), Some(expected));
    }

    #[test]
    fn test_concurrent() {
        let roots: Vec<_> = (0..4)
            .map(|_| thread::spawn(root::<Cached>))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        for root in &roots[1..] {
            assert!(Arc::ptr_eq(&roots[0], root));
        }
    }
}
