//! Tagged unions: a router picks which named differencer handles a transition.

use crate::differencer::{foreign_diff, Delta, Differencer, Diff, DynDifferencer, ForwardReverse};
use crate::error::{DiffError, Result};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Picks a route name for the transition `from -> to`.
pub type Router = Arc<dyn Fn(&Value, &Value) -> String + Send + Sync>;

/// Decides whether two diffs produced under different routes conflict.
pub type CrossIntersector = Arc<dyn Fn(&Diff, &Diff) -> bool + Send + Sync>;

/// Differencer over a union of value shapes.
///
/// Diffs are tagged with the route that produced them, so they can be
/// replayed through the same route later.
#[derive(Clone)]
pub struct RoutingDifferencer {
    routes: IndexMap<String, DynDifferencer>,
    router: Router,
    cross_intersector: CrossIntersector,
}

impl RoutingDifferencer {
    /// Build from named routes and a router.
    ///
    /// Diffs from different routes are treated as conflicting until
    /// [`RoutingDifferencer::cross_intersector`] says otherwise.
    pub fn new<N, F>(routes: impl IntoIterator<Item = (N, DynDifferencer)>, router: F) -> Result<Self>
    where
        N: Into<String>,
        F: Fn(&Value, &Value) -> String + Send + Sync + 'static,
    {
        let mut table = IndexMap::new();
        for (name, differencer) in routes {
            let name = name.into();
            if table.contains_key(&name) {
                return Err(DiffError::DuplicateRoute(name));
            }
            table.insert(name, differencer);
        }
        if table.is_empty() {
            return Err(DiffError::EmptyRoutes);
        }
        Ok(Self {
            routes: table,
            router: Arc::new(router),
            cross_intersector: Arc::new(|_, _| true),
        })
    }

    /// Set the check used when two diffs take different routes.
    pub fn cross_intersector<F>(mut self, intersector: F) -> Self
    where
        F: Fn(&Diff, &Diff) -> bool + Send + Sync + 'static,
    {
        self.cross_intersector = Arc::new(intersector);
        self
    }

    /// Get the differencer for a route.
    pub fn route(&self, name: &str) -> Option<&DynDifferencer> {
        self.routes.get(name)
    }

    /// Iterate route names in declaration order.
    pub fn route_names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl Differencer<Value> for RoutingDifferencer {
    type Diff = Diff;

    /// # Panics
    ///
    /// Panics if the router names a route that was never registered.
    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        let route = (self.router)(from, to);
        let Some(differencer) = self.routes.get(&route) else {
            panic!("{}", DiffError::UnknownRoute(route));
        };
        let diffs = differencer.calculate_diffs(from, to);
        if diffs.is_empty() {
            return ForwardReverse::empty();
        }
        ForwardReverse::new(
            Diff::Routing { route: route.clone(), diff: Box::new(diffs.forward) },
            Diff::Routing { route, diff: Box::new(diffs.reverse) },
        )
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Routing { route, diff } => match self.routes.get(route) {
                Some(differencer) => differencer.apply_diff(value, diff),
                None => {
                    tracing::warn!(route = %route, "diff names an unknown route; leaving value unchanged");
                    value.clone()
                }
            },
            other => {
                foreign_diff("routing", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        match (a, b) {
            (
                Diff::Routing { route: route_a, diff: inner_a },
                Diff::Routing { route: route_b, diff: inner_b },
            ) if route_a == route_b => match self.routes.get(route_a) {
                Some(differencer) => differencer.diffs_intersect(inner_a, inner_b),
                None => true,
            },
            (Diff::Routing { .. }, Diff::Routing { .. }) => (self.cross_intersector)(a, b),
            _ => true,
        }
    }
}
