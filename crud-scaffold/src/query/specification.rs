//! Query specification handed to repositories
//!
//! A [`Specification`] bundles an optional predicate, ordering, paging and
//! eager-load hints. It performs no validation and no I/O; the store decides
//! how to honour it. Includes may be appended after construction, nothing
//! else changes.
//!
//! # Example
//!
//! ```rust,ignore
//! let predicate = build_predicate::<User>(&parse_filter("name_bo", Op::Contains)?)?;
//! let order_by = build_sort_selector::<User>(Some("age"))?;
//!
//! let mut spec = Specification::paged(predicate, order_by, true, Some(20), Some(10), None);
//! spec.add_include(User::ROLES).add_include_path("roles.permissions");
//!
//! let users = repository.find_by_spec(&spec).await?;
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::predicate::Predicate;
use super::sort::SortSelector;
use crate::entity::Relation;

/// Entity-to-entity transform applied to query results
///
/// Two projections are equal only when they share the same underlying closure.
pub struct Projection<T>(Arc<dyn Fn(T) -> T + Send + Sync>);

impl<T> Projection<T> {
    /// Wrap a closure
    pub fn new(f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the projection
    pub fn apply(&self, entity: T) -> T {
        (self.0)(entity)
    }
}

impl<T> Clone for Projection<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for Projection<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Projection(..)")
    }
}

/// Immutable query descriptor: predicate, ordering, paging, includes
pub struct Specification<T> {
    criteria: Option<Predicate<T>>,
    order_by: Option<SortSelector<T>>,
    order_by_descending: Option<SortSelector<T>>,
    order_by_list: Vec<SortSelector<T>>,
    order_by_descending_list: Vec<SortSelector<T>>,
    includes: Vec<Relation<T>>,
    include_strings: Vec<String>,
    skip: Option<u64>,
    take: Option<u64>,
    selector: Option<Projection<T>>,
}

impl<T> Specification<T> {
    /// Predicate only; `None` matches every entity
    #[must_use]
    pub fn new(criteria: Option<Predicate<T>>) -> Self {
        Self {
            criteria,
            order_by: None,
            order_by_descending: None,
            order_by_list: Vec::new(),
            order_by_descending_list: Vec::new(),
            includes: Vec::new(),
            include_strings: Vec::new(),
            skip: None,
            take: None,
            selector: None,
        }
    }

    /// Predicate with a single sort key
    ///
    /// `descending` decides which of the two single-key slots receives
    /// `order_by`; the other stays empty.
    #[must_use]
    pub fn ordered(
        criteria: Option<Predicate<T>>,
        order_by: Option<SortSelector<T>>,
        descending: bool,
        selector: Option<Projection<T>>,
    ) -> Self {
        let mut spec = Self::new(criteria);
        if descending {
            spec.order_by_descending = order_by;
        } else {
            spec.order_by = order_by;
        }
        spec.selector = selector;
        spec
    }

    /// Predicate with a single sort key and an offset/limit window
    #[must_use]
    pub fn paged(
        criteria: Option<Predicate<T>>,
        order_by: Option<SortSelector<T>>,
        descending: bool,
        skip: Option<u64>,
        take: Option<u64>,
        selector: Option<Projection<T>>,
    ) -> Self {
        let mut spec = Self::ordered(criteria, order_by, descending, selector);
        spec.skip = skip;
        spec.take = take;
        spec
    }

    /// Predicate with several sort keys sharing one direction
    #[must_use]
    pub fn multi_ordered(
        criteria: Option<Predicate<T>>,
        order_by_list: Vec<SortSelector<T>>,
        descending: bool,
        skip: Option<u64>,
        take: Option<u64>,
        selector: Option<Projection<T>>,
    ) -> Self {
        let mut spec = Self::new(criteria);
        if descending {
            spec.order_by_descending_list = order_by_list;
        } else {
            spec.order_by_list = order_by_list;
        }
        spec.skip = skip;
        spec.take = take;
        spec.selector = selector;
        spec
    }

    /// Request eager loading of a typed relation
    pub fn add_include(&mut self, relation: Relation<T>) -> &mut Self {
        self.includes.push(relation);
        self
    }

    /// Request eager loading of a dotted relation path
    pub fn add_include_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.include_strings.push(path.into());
        self
    }

    /// Filter predicate; `None` matches every entity
    pub fn criteria(&self) -> Option<&Predicate<T>> {
        self.criteria.as_ref()
    }

    /// Single ascending sort key
    pub fn order_by(&self) -> Option<&SortSelector<T>> {
        self.order_by.as_ref()
    }

    /// Single descending sort key
    pub fn order_by_descending(&self) -> Option<&SortSelector<T>> {
        self.order_by_descending.as_ref()
    }

    /// Ascending sort keys, applied after the single keys
    pub fn order_by_list(&self) -> &[SortSelector<T>] {
        &self.order_by_list
    }

    /// Descending sort keys, applied last
    pub fn order_by_descending_list(&self) -> &[SortSelector<T>] {
        &self.order_by_descending_list
    }

    /// Typed relations to load eagerly
    pub fn includes(&self) -> &[Relation<T>] {
        &self.includes
    }

    /// Dotted relation paths to load eagerly
    pub fn include_strings(&self) -> &[String] {
        &self.include_strings
    }

    /// Number of matching entities to skip
    pub const fn skip(&self) -> Option<u64> {
        self.skip
    }

    /// Maximum number of entities to return
    pub const fn take(&self) -> Option<u64> {
        self.take
    }

    /// Projection applied to each result
    pub fn selector(&self) -> Option<&Projection<T>> {
        self.selector.as_ref()
    }

    /// Whether any ordering was requested
    pub fn is_ordered(&self) -> bool {
        self.order_by.is_some()
            || self.order_by_descending.is_some()
            || !self.order_by_list.is_empty()
            || !self.order_by_descending_list.is_empty()
    }

    /// Evaluate the predicate against an entity; no predicate matches all
    pub fn matches(&self, entity: &T) -> bool {
        self.criteria.as_ref().map_or(true, |p| p.matches(entity))
    }

    /// Compare two entities by every requested sort key
    ///
    /// Keys apply in this order: single ascending, single descending,
    /// ascending list, descending list. Returns `Equal` when unordered.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let single = self
            .order_by
            .iter()
            .map(|s| s.compare(a, b))
            .chain(self.order_by_descending.iter().map(|s| s.compare(b, a)));
        let lists = self
            .order_by_list
            .iter()
            .map(|s| s.compare(a, b))
            .chain(self.order_by_descending_list.iter().map(|s| s.compare(b, a)));

        single
            .chain(lists)
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Apply the projection, if any
    pub fn project(&self, entity: T) -> T {
        match &self.selector {
            Some(selector) => selector.apply(entity),
            None => entity,
        }
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            order_by: self.order_by.clone(),
            order_by_descending: self.order_by_descending.clone(),
            order_by_list: self.order_by_list.clone(),
            order_by_descending_list: self.order_by_descending_list.clone(),
            includes: self.includes.clone(),
            include_strings: self.include_strings.clone(),
            skip: self.skip,
            take: self.take,
            selector: self.selector.clone(),
        }
    }
}

impl<T> PartialEq for Specification<T> {
    fn eq(&self, other: &Self) -> bool {
        self.criteria == other.criteria
            && self.order_by == other.order_by
            && self.order_by_descending == other.order_by_descending
            && self.order_by_list == other.order_by_list
            && self.order_by_descending_list == other.order_by_descending_list
            && self.includes == other.includes
            && self.include_strings == other.include_strings
            && self.skip == other.skip
            && self.take == other.take
            && self.selector == other.selector
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.criteria)
            .field("order_by", &self.order_by)
            .field("order_by_descending", &self.order_by_descending)
            .field("order_by_list", &self.order_by_list)
            .field("order_by_descending_list", &self.order_by_descending_list)
            .field("includes", &self.includes)
            .field("include_strings", &self.include_strings)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("selector", &self.selector)
            .finish()
    }
}
