//! Per-runner table of declared parameters.

use indexmap::IndexMap;

use crate::converter::{ParamType, ParamValue};
use crate::error::{ExecutionError, LoadError};

/// Ordered mapping of parameter name to declared type.
///
/// Built from `name:type` declarations; the declaration order is kept and
/// drives the enumeration order of the parameter space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterTable {
    entries: IndexMap<String, ParamType>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of `name:type` declarations.
    pub fn from_declarations<S: AsRef<str>>(declarations: &[S]) -> Result<Self, LoadError> {
        let mut table = Self::new();
        for declaration in declarations {
            let (name, ty) = parse_declaration(declaration.as_ref())?;
            table.insert(name, ty)?;
        }
        Ok(table)
    }

    /// Add a parameter; names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, ty: ParamType) -> Result<(), LoadError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(LoadError::DuplicateParameter { name });
        }
        self.entries.insert(name, ty);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ParamType> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Check that `provided` names exactly the declared parameters.
    ///
    /// Missing names are reported before unknown ones. Missing names come in
    /// declaration order, unknown names sorted.
    pub fn validate<'a, I>(&self, provided: I) -> Result<(), ExecutionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let provided: Vec<&str> = provided.into_iter().collect();

        let missing: Vec<String> = self
            .names()
            .filter(|name| !provided.contains(name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ExecutionError::MissingParameters { keys: missing });
        }

        let mut unknown: Vec<String> = provided
            .iter()
            .filter(|name| !self.contains(name))
            .map(|name| name.to_string())
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(ExecutionError::UnknownParameters { keys: unknown });
        }

        Ok(())
    }

    /// Convert raw strings for every declared parameter, in declaration order.
    ///
    /// `lookup` must return a value for each declared name; call
    /// [`validate`](Self::validate) first.
    pub fn convert<'a, F>(&self, lookup: F) -> Result<IndexMap<String, Vec<ParamValue>>, ExecutionError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut converted = IndexMap::with_capacity(self.entries.len());
        for (name, ty) in self.iter() {
            let raw = lookup(name).ok_or_else(|| ExecutionError::MissingParameters {
                keys: vec![name.to_string()],
            })?;
            let values = ty.convert(raw).map_err(|source| ExecutionError::Conversion {
                name: name.to_string(),
                source,
            })?;
            converted.insert(name.to_string(), values);
        }
        Ok(converted)
    }
}

fn parse_declaration(declaration: &str) -> Result<(String, ParamType), LoadError> {
    let invalid = || LoadError::InvalidDeclaration {
        declaration: declaration.to_string(),
    };

    let (name, type_name) = declaration.split_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    let type_name = type_name.trim();
    if name.is_empty() || type_name.contains(':') {
        return Err(invalid());
    }

    let ty = ParamType::from_name(type_name).ok_or_else(|| LoadError::UnknownType {
        name: name.to_string(),
        type_name: type_name.to_string(),
    })?;
    Ok((name.to_string(), ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ParameterTable {
        ParameterTable::from_declarations(&["size:int", "scale:float", "input:path"]).unwrap()
    }

    #[test]
    fn test_declarations_keep_order() {
        let table = table();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["size", "scale", "input"]);
        assert_eq!(table.get("scale"), Some(ParamType::Float));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_invalid_declarations() {
        assert!(matches!(
            ParameterTable::from_declarations(&["size"]),
            Err(LoadError::InvalidDeclaration { .. })
        ));
        assert!(matches!(
            ParameterTable::from_declarations(&["size:int:x"]),
            Err(LoadError::InvalidDeclaration { .. })
        ));
        assert!(matches!(
            ParameterTable::from_declarations(&["size:bool"]),
            Err(LoadError::UnknownType { .. })
        ));
        assert!(matches!(
            ParameterTable::from_declarations(&["a:int", "a:str"]),
            Err(LoadError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_validate_reports_missing_first() {
        let err = table().validate(["bogus"]).unwrap_err();
        match err {
            ExecutionError::MissingParameters { keys } => {
                assert_eq!(keys, vec!["size", "scale", "input"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_reports_unknown() {
        let err = table()
            .validate(["size", "zeta", "scale", "input", "alpha"])
            .unwrap_err();
        assert_eq!(err.to_string(), "don't know `alpha`, `zeta`");
    }

    #[test]
    fn test_validate_accepts_exact_set() {
        assert!(table().validate(["input", "size", "scale"]).is_ok());
    }

    #[test]
    fn test_convert_in_declaration_order() {
        let raw = [("input", "a.raw"), ("scale", "0:1:3"), ("size", "8")];
        let converted = table()
            .convert(|name| raw.iter().find(|(k, _)| *k == name).map(|(_, v)| *v))
            .unwrap();

        assert_eq!(
            converted.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["size", "scale", "input"]
        );
        assert_eq!(converted["scale"].len(), 3);
        assert_eq!(converted["size"], vec![ParamValue::Int(8)]);
    }

    #[test]
    fn test_convert_error_names_parameter() {
        let err = table()
            .convert(|name| match name {
                "size" => Some("big"),
                _ => Some("1"),
            })
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Conversion { ref name, .. } if name == "size"));
    }
}
