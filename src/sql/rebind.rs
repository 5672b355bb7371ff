use tracing::trace;

use crate::{
    reflect::{Kind, Reflect},
    sql::{find_named_params, rewrite_placeholders, Dialect, ParamLookup, SqlError},
    value::SqlValue,
};

/// A rewritten query with its positional arguments, borrowed from the
/// caller's parameters.
pub struct Rebound<'a> {
    pub query: String,
    pub args: Vec<&'a dyn Reflect>,
}

impl std::fmt::Debug for Rebound<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rebound")
            .field("query", &self.query)
            .field("args", &self.args.iter().map(|a| a.to_value()).collect::<Vec<_>>())
            .finish()
    }
}

impl Rebound<'_> {
    /// The arguments in driver form. Arguments without a scalar form, such
    /// as records passed positionally, are rejected.
    pub fn values(&self) -> Result<Vec<SqlValue>, SqlError> {
        self.args
            .iter()
            .map(|arg| arg.to_value().ok_or_else(|| SqlError::UnsupportedArgument(arg.shape().name)))
            .collect()
    }
}

/// Resolves `:name` parameters and rewrites `?` markers for `dialect`.
///
/// Named binding applies when exactly one argument is passed and its type,
/// seen through pointers, is a record or a text-keyed map. Sequences expand
/// into one marker per item (`NULL` when empty); byte vectors stay scalar.
/// Any other argument list is positional: only the markers are rewritten
/// and the arguments pass through in order.
///
/// ```
/// use rowbind::{params, rebind, Dialect};
///
/// let p = params! { "x" => 9i64, "arr" => [1i64] };
/// let bound = rebind("WHERE a=:x OR c IN (:arr) OR d=:x", Dialect::Dollar, &[&p]).unwrap();
/// assert_eq!(bound.query, "WHERE a=$1 OR c IN ($2) OR d=$3");
/// assert_eq!(bound.args.len(), 3);
/// ```
pub fn rebind<'a>(query: &str, dialect: Dialect, params: &[&'a dyn Reflect]) -> Result<Rebound<'a>, SqlError> {
    match params {
        [single] if is_bindable(*single) => {
            let Some((expanded, args)) = bind_named(query, *single)? else {
                trace!("no named parameters in query, leaving it untouched");
                return Ok(Rebound { query: query.to_string(), args: Vec::new() });
            };
            trace!(?dialect, args = args.len(), "bound named parameters");
            Ok(Rebound { query: rewrite_placeholders(&expanded, dialect)?, args })
        }
        _ => {
            trace!(?dialect, args = params.len(), "positional passthrough");
            Ok(Rebound { query: rewrite_placeholders(query, dialect)?, args: params.to_vec() })
        }
    }
}

/// Named binding is decided on the argument's type, not its value: an empty
/// pointer to a record still takes the named path and fails with
/// `SqlError::NilParameters`. It never falls back to positional
/// passthrough, so a missing parameter record cannot silently bind as a
/// single positional argument.
pub fn is_bindable(param: &dyn Reflect) -> bool {
    matches!(param.shape().deref().kind, Kind::Record(_) | Kind::Map)
}

fn bind_named<'a>(query: &str, params: &'a dyn Reflect) -> Result<Option<(String, Vec<&'a dyn Reflect>)>, SqlError> {
    let tokens = find_named_params(query)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let lookup = ParamLookup::build(params)?;

    let mut out = String::with_capacity(query.len());
    let mut args = Vec::with_capacity(tokens.len());
    let mut last = 0;

    for token in &tokens {
        out.push_str(&query[last..token.start]);
        let value = lookup
            .get(token.name)
            .ok_or_else(|| SqlError::MissingValue(token.name.to_string()))?;

        match value.elements() {
            Some(items) if items.is_empty() => out.push_str("NULL"),
            Some(items) => {
                for (i, item) in items.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('?');
                    args.push(item);
                }
            }
            None => {
                out.push('?');
                args.push(value);
            }
        }
        last = token.end;
    }
    out.push_str(&query[last..]);

    Ok(Some((out, args)))
}

/// Rebinding for one dialect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Binder {
    dialect: Dialect,
}

impl Binder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn for_driver(driver: &str) -> Self {
        Self::new(Dialect::for_driver(driver))
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn rebind<'a>(&self, query: &str, params: &[&'a dyn Reflect]) -> Result<Rebound<'a>, SqlError> {
        rebind(query, self.dialect, params)
    }
}
