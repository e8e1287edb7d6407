use std::fmt;

/// A per-element force parameter: either a constant or a function of
/// `(element, index, elements)`.
///
/// Forces evaluate accessors once per element at initialization time into
/// dense arrays indexed by element position. User functions therefore never
/// run inside the per-tick loops, and force application reads a stable
/// snapshot for the whole tick.
pub enum Accessor<E, V = f64> {
    Constant(V),
    Fn(Box<dyn Fn(&E, usize, &[E]) -> V>),
}

impl<E, V: Clone> Accessor<E, V> {
    pub fn constant(value: V) -> Self {
        Self::Constant(value)
    }

    pub fn per_element(f: impl Fn(&E, usize, &[E]) -> V + 'static) -> Self {
        Self::Fn(Box::new(f))
    }

    /// The value for a single element.
    pub fn get(&self, element: &E, index: usize, elements: &[E]) -> V {
        match self {
            Self::Constant(v) => v.clone(),
            Self::Fn(f) => f(element, index, elements),
        }
    }

    /// Evaluates the accessor over a whole element set.
    pub fn materialize(&self, elements: &[E]) -> Vec<V> {
        match self {
            Self::Constant(v) => vec![v.clone(); elements.len()],
            Self::Fn(f) => elements
                .iter()
                .enumerate()
                .map(|(i, e)| f(e, i, elements))
                .collect(),
        }
    }
}

impl<E, V: fmt::Debug> fmt::Debug for Accessor<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}
