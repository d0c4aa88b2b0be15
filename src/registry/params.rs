use std::collections::{BTreeMap, HashMap};

/// Where a handler parameter gets its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Read from the request's query string under `name`.
    Query { name: String },
}

/// Positional arguments assembled for one handler invocation.
///
/// Every position up to the highest bound index is present. A position whose
/// query key was missing, or that has no binding at all, holds `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    values: Vec<Option<String>>,
}

impl QueryArgs {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    pub(crate) fn from_query(
        bindings: &BTreeMap<usize, ParamBinding>,
        query: &HashMap<String, String>,
    ) -> Self {
        let len = bindings.keys().next_back().map_or(0, |last| last + 1);
        let mut values = vec![None; len];
        for (index, binding) in bindings {
            values[*index] = match binding {
                ParamBinding::Query { name } => query.get(name).cloned(),
            };
        }
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Moves the value at `index` out, leaving `None` behind.
    pub fn take(&mut self, index: usize) -> Option<String> {
        self.values.get_mut(index).and_then(Option::take)
    }

    /// Takes the value at `index` and converts it into the parameter type.
    pub fn arg<T: FromQueryValue>(&mut self, index: usize) -> T {
        T::from_query_value(self.take(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Conversion from a possibly-absent query value into a handler parameter.
///
/// Absence is never an error: `Option<String>` sees `None`, `String` sees `""`.
pub trait FromQueryValue: Sized {
    fn from_query_value(value: Option<String>) -> Self;
}

impl FromQueryValue for Option<String> {
    fn from_query_value(value: Option<String>) -> Self {
        value
    }
}

impl FromQueryValue for String {
    fn from_query_value(value: Option<String>) -> Self {
        value.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: &str) -> ParamBinding {
        ParamBinding::Query { name: name.to_string() }
    }

    #[test]
    fn test_from_query_fills_bound_positions() {
        let mut bindings = BTreeMap::new();
        bindings.insert(0, query("cityName"));
        bindings.insert(2, query("units"));

        let mut params = HashMap::new();
        params.insert("cityName".to_string(), "Dublin".to_string());
        params.insert("ignored".to_string(), "x".to_string());

        let args = QueryArgs::from_query(&bindings, &params);
        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0), Some("Dublin"));
        assert_eq!(args.get(1), None);
        assert_eq!(args.get(2), None);
    }

    #[test]
    fn test_no_bindings_gives_empty_args() {
        let args = QueryArgs::from_query(&BTreeMap::new(), &HashMap::new());
        assert!(args.is_empty());
    }

    #[test]
    fn test_arg_conversions() {
        let mut args = QueryArgs::new(vec![Some("London".into()), None, None]);
        let city: Option<String> = args.arg(0);
        let missing: String = args.arg(1);
        let out_of_range: Option<String> = args.arg(7);

        assert_eq!(city.as_deref(), Some("London"));
        assert_eq!(missing, "");
        assert_eq!(out_of_range, None);
        assert_eq!(args.get(0), None, "arg() moves the value out");
    }
}
