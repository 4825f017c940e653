//! Rule Registry
//!
//! Maps each concrete element type to the rule that enumerates that
//! element's dependencies.
//!
//! Lookup is by exact run-time type. There is no supertype matching: a rule
//! registered for one type never applies to another, and element types with
//! no rule go to the driver's fallback rule.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use super::collector::Collector;
use crate::error::{RuleError, TraceError};
use crate::scene::{downcast_element, Element};

/// Enumerates the dependencies of one element type.
///
/// Before returning, a rule must have declared every dependency the element
/// can have, and marked the element as an entrypoint if it has effects that
/// do not depend on any other element.
pub trait DependencyRule<T: Element>: 'static {
    fn collect(&self, element: &T, collector: &mut Collector<'_>) -> Result<(), RuleError>;
}

impl<T, F> DependencyRule<T> for F
where
    T: Element,
    F: Fn(&T, &mut Collector<'_>) -> Result<(), RuleError> + 'static,
{
    fn collect(&self, element: &T, collector: &mut Collector<'_>) -> Result<(), RuleError> {
        self(element, collector)
    }
}

/// A rule with its element type erased, as stored in the registry.
pub trait AnyRule {
    /// Name of the element type this rule handles.
    fn element_type(&self) -> &'static str;

    fn collect_element(&self, element: &dyn Element, collector: &mut Collector<'_>) -> Result<(), RuleError>;
}

struct TypedRule<T, R> {
    rule: R,
    _element: PhantomData<fn(&T)>,
}

impl<T, R> AnyRule for TypedRule<T, R>
where
    T: Element,
    R: DependencyRule<T>,
{
    fn element_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn collect_element(&self, element: &dyn Element, collector: &mut Collector<'_>) -> Result<(), RuleError> {
        let element = downcast_element::<T>(element).ok_or(RuleError::ElementMismatch {
            expected: type_name::<T>(),
        })?;
        self.rule.collect(element, collector)
    }
}

/// Lookup from element type to dependency rule.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<TypeId, Box<dyn AnyRule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the rules for the built-in element types.
    pub fn with_standard_rules() -> Result<Self, TraceError> {
        let mut registry = Self::new();
        crate::rules::register_standard_rules(&mut registry)?;
        Ok(registry)
    }

    /// Register `rule` for elements of type `T`.
    ///
    /// Only one rule may exist per type.
    pub fn register<T, R>(&mut self, rule: R) -> Result<(), TraceError>
    where
        T: Element,
        R: DependencyRule<T>,
    {
        let type_id = TypeId::of::<T>();
        if self.rules.contains_key(&type_id) {
            return Err(TraceError::DuplicateRule {
                type_name: type_name::<T>(),
            });
        }

        self.rules.insert(
            type_id,
            Box::new(TypedRule {
                rule,
                _element: PhantomData,
            }),
        );
        Ok(())
    }

    /// Register a closure as the rule for elements of type `T`.
    pub fn register_fn<T, F>(&mut self, rule: F) -> Result<(), TraceError>
    where
        T: Element,
        F: Fn(&T, &mut Collector<'_>) -> Result<(), RuleError> + 'static,
    {
        self.register::<T, F>(rule)
    }

    /// Find the rule for the exact type `type_id`.
    pub fn try_get_rule(&self, type_id: TypeId) -> Option<&dyn AnyRule> {
        self.rules.get(&type_id).map(|rule| &**rule)
    }

    /// Whether a rule is registered for `T`.
    pub fn contains<T: Element>(&self) -> bool {
        self.rules.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
